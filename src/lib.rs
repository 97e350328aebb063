use std::error::Error;

pub mod assets;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod model;
pub mod pages;
pub mod render;
pub mod routes;

#[cfg(test)]
mod testing;

/// Flattens an error and its source chain into one log-friendly line.
pub fn unpack_error(err: &dyn Error) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_unpack_error() {
        let err = StoreError::Backend(libsql::Error::ConnectionFailed("disk unavailable".to_string()));
        let line = unpack_error(&err);
        assert!(line.starts_with("storage backend failure: "));
        assert!(line.contains("disk unavailable"));
    }
}
