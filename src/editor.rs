//! Editor panel boundary.
//!
//! The rich-text engine is an external collaborator. It receives the page's
//! HTML and reports the edited HTML through a callback; it knows nothing
//! about persistence. Callers wire `on_change` to the page repository.

use crate::db::DocsError;
use std::path::PathBuf;
use std::process::Command;

/// Something that lets the user edit HTML content.
pub trait ContentEditor {
    /// Present `content` for editing. `on_change` receives the full new HTML
    /// whenever the content changed; it is not called for an unchanged edit.
    fn edit(&self, content: &str, on_change: &mut dyn FnMut(String)) -> Result<(), DocsError>;
}

/// Edits content in the user's editor via a temp `.html` file.
pub struct ExternalEditor {
    command: String,
    scratch_name: String,
}

impl ExternalEditor {
    /// Create an editor with the given command (program plus optional args).
    pub fn new(command: String) -> Self {
        Self {
            command,
            scratch_name: format!("pagekeep-{}.html", uuid::Uuid::new_v4()),
        }
    }

    /// Parse the command into program and arguments. An empty command falls
    /// back to `vi`.
    fn parse_command(&self) -> (String, Vec<String>) {
        let mut parts = self.command.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(program) => (program, parts.collect()),
            None => ("vi".to_string(), vec![]),
        }
    }

    fn scratch_path(&self) -> PathBuf {
        std::env::temp_dir().join(&self.scratch_name)
    }

    fn run(&self, path: &std::path::Path) -> Result<(), DocsError> {
        let (program, mut args) = self.parse_command();
        args.push(path.to_string_lossy().to_string());

        #[cfg(windows)]
        let status = Command::new("cmd").arg("/C").arg(&program).args(&args).status();
        #[cfg(not(windows))]
        let status = Command::new(&program).args(&args).status();

        let status = status.map_err(|e| {
            DocsError::Editor(format!("Failed to launch editor '{}': {}", program, e))
        })?;
        if !status.success() {
            return Err(DocsError::Editor(format!(
                "Editor '{}' exited with {}",
                program, status
            )));
        }
        Ok(())
    }
}

impl ContentEditor for ExternalEditor {
    fn edit(&self, content: &str, on_change: &mut dyn FnMut(String)) -> Result<(), DocsError> {
        let path = self.scratch_path();
        std::fs::write(&path, content)?;

        let outcome = self.run(&path).and_then(|()| {
            let edited = std::fs::read(&path)?;
            String::from_utf8(edited).map_err(|e| {
                tracing::warn!(error = %e, "edited content is not UTF-8, discarding");
                DocsError::Editor("Edited content is not valid UTF-8".to_string())
            })
        });
        let _ = std::fs::remove_file(&path);

        let edited = outcome?;
        if edited != content {
            on_change(edited);
        } else {
            tracing::debug!("editor closed without changes");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_simple() {
        let editor = ExternalEditor::new("vim".to_string());
        let (program, args) = editor.parse_command();
        assert_eq!(program, "vim");
        assert!(args.is_empty());
    }

    #[test]
    fn test_parse_command_with_args() {
        let editor = ExternalEditor::new("  code   --wait  ".to_string());
        let (program, args) = editor.parse_command();
        assert_eq!(program, "code");
        assert_eq!(args, vec!["--wait"]);
    }

    #[test]
    fn test_parse_command_empty_falls_back() {
        let editor = ExternalEditor::new(String::new());
        let (program, args) = editor.parse_command();
        assert_eq!(program, "vi");
        assert!(args.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unchanged_content_skips_callback() {
        // `true` exits 0 without touching the file
        let editor = ExternalEditor::new("true".to_string());
        let mut calls = 0;
        editor
            .edit("<p>same</p>", &mut |_| calls += 1)
            .expect("edit");
        assert_eq!(calls, 0);
        assert!(!editor.scratch_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_changed_content_reaches_callback() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("fake-editor.sh");
        std::fs::write(&script, "#!/bin/sh\nprintf '<p>edited</p>' > \"$1\"\n").expect("write script");
        let editor = ExternalEditor::new(format!("sh {}", script.display()));

        let mut received = Vec::new();
        editor
            .edit("<p>original</p>", &mut |html| received.push(html))
            .expect("edit");
        assert_eq!(received, vec!["<p>edited</p>".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_editor_is_an_error() {
        let editor = ExternalEditor::new("false".to_string());
        let mut calls = 0;
        let result = editor.edit("<p>x</p>", &mut |_| calls += 1);
        assert!(matches!(result, Err(DocsError::Editor(_))));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let editor = ExternalEditor::new("pagekeep-no-such-editor-binary".to_string());
        let result = editor.edit("<p>x</p>", &mut |_| {});
        assert!(matches!(result, Err(DocsError::Editor(_))));
    }
}
