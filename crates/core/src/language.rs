//! Language identification from file extensions.

use std::path::Path;

/// Returns the language identifier for a file path, keyed on its
/// (case-insensitive) extension. Unknown extensions are `"plaintext"`.
pub fn language_for_path(path: &Path) -> &'static str {
    let extension = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_ascii_lowercase(),
        None => return "plaintext",
    };
    match extension.as_str() {
        "txt" => "plaintext",
        "md" => "markdown",
        "go" => "go",
        "js" => "javascript",
        "ts" => "typescript",
        "jsx" => "javascriptreact",
        "tsx" => "typescriptreact",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "xml" => "xml",
        "yaml" | "yml" => "yaml",
        "py" => "python",
        "rb" => "ruby",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "cs" => "csharp",
        "php" => "php",
        "rs" => "rust",
        "swift" => "swift",
        "lua" => "lua",
        "sh" => "shellscript",
        "bat" => "bat",
        "ps1" => "powershell",
        _ => "plaintext",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(language_for_path(Path::new("a/b/readme.md")), "markdown");
        assert_eq!(language_for_path(Path::new("main.rs")), "rust");
        assert_eq!(language_for_path(Path::new("app.tsx")), "typescriptreact");
        assert_eq!(language_for_path(Path::new("conf.yml")), "yaml");
        assert_eq!(language_for_path(Path::new("conf.yaml")), "yaml");
        assert_eq!(language_for_path(Path::new("def.hpp")), "cpp");
        assert_eq!(language_for_path(Path::new("def.h")), "c");
        assert_eq!(language_for_path(Path::new("run.ps1")), "powershell");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(language_for_path(Path::new("NOTES.MD")), "markdown");
        assert_eq!(language_for_path(Path::new("Main.RS")), "rust");
    }

    #[test]
    fn test_unknown_defaults_to_plaintext() {
        assert_eq!(language_for_path(Path::new("file.xyz")), "plaintext");
        assert_eq!(language_for_path(Path::new("Makefile")), "plaintext");
        assert_eq!(language_for_path(Path::new("notes.txt")), "plaintext");
    }
}
