use crate::error::RenderError;
use minijinja::Environment;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const NOTE: &str = "note.html";
pub const PAGE: &str = "page.html";
pub const STATS: &str = "stats.html";

const REQUIRED: [&str; 3] = [NOTE, PAGE, STATS];

/// The parsed template set. Built once at startup and shared read-only.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Parses every `*.html` file in `dir`, keyed by file name.
    ///
    /// Fails on unreadable files, syntax errors, or when one of the templates
    /// the handlers rely on is absent.
    pub fn load(dir: &Path) -> Result<Self, RenderError> {
        let io_err = |source: std::io::Error| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut env = Environment::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("html") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };

            let source = fs::read_to_string(&path).map_err(io_err)?;
            env.add_template_owned(name.clone(), source)
                .map_err(|source| RenderError::Template { name: name.clone(), source })?;
            tracing::debug!(template = %name, "loaded template");
        }

        for name in REQUIRED {
            if env.get_template(name).is_err() {
                return Err(RenderError::Missing(name));
            }
        }

        Ok(Renderer { env })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        let to_err = |source: minijinja::Error| RenderError::Template {
            name: name.to_owned(),
            source,
        };
        let tmpl = self.env.get_template(name).map_err(to_err)?;
        tmpl.render(data).map_err(to_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Note;
    use std::path::PathBuf;

    fn templates_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/templates")
    }

    fn write_required(dir: &Path) {
        for name in REQUIRED {
            fs::write(dir.join(name), "{{ title }}").unwrap();
        }
    }

    #[test]
    fn test_load_bundled_templates() {
        let renderer = Renderer::load(&templates_dir()).unwrap();
        let html = renderer
            .render(NOTE, &Note::page("Hello", "<p>world</p>".to_string()))
            .unwrap();
        assert!(html.contains("Hello"));
        assert!(html.contains("<p>world</p>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let renderer = Renderer::load(&templates_dir()).unwrap();
        let note = Note::new("<b>not bold</b>".to_string(), None);
        let html = renderer.render(NOTE, &note).unwrap();
        assert!(html.contains("&lt;b&gt;not bold"));
        assert!(!html.contains("<b>not bold"));
    }

    #[test]
    fn test_missing_required_template() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(NOTE), "{{ title }}").unwrap();

        let err = Renderer::load(dir.path()).err().unwrap();
        assert!(matches!(err, RenderError::Missing(PAGE) | RenderError::Missing(STATS)));
    }

    #[test]
    fn test_malformed_template() {
        let dir = tempfile::tempdir().unwrap();
        write_required(dir.path());
        fs::write(dir.path().join("broken.html"), "{% if %}").unwrap();

        let err = Renderer::load(dir.path()).err().unwrap();
        assert!(matches!(err, RenderError::Template { ref name, .. } if name == "broken.html"));
    }

    #[test]
    fn test_unknown_template() {
        let dir = tempfile::tempdir().unwrap();
        write_required(dir.path());
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let renderer = Renderer::load(dir.path()).unwrap();
        assert!(renderer.render("notes.txt", &Note::default()).is_err());
        assert_eq!(renderer.render(PAGE, &Note::page("TOS", String::new())).unwrap(), "TOS");
    }
}
