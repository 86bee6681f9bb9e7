//! RON loader for tree documents.

use std::path::Path;

use crate::description::TreeDocument;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Loader for [`TreeDocument`]s stored as RON.
///
/// ```ron
/// (
///     main_tree_to_execute: Some("MainTree"),
///     trees: [
///         (
///             id: "MainTree",
///             roots: [
///                 (
///                     type: "Sequence",
///                     children: [
///                         (type: "SaySomething", ports: {"message": "{greeting}"}),
///                         (type: "AlwaysSuccess"),
///                     ],
///                 ),
///             ],
///         ),
///     ],
/// )
/// ```
pub struct TreeLoader;

impl TreeLoader {
    /// Load a tree document from a RON file.
    pub fn load(path: &Path) -> LoadResult<TreeDocument> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load tree document {}: {}", path.display(), e))
    }

    /// Parse a tree document from RON text.
    pub fn parse(content: &str) -> LoadResult<TreeDocument> {
        let document: TreeDocument = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tree RON: {}", e))?;

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::port::PortValue;

    const DOCUMENT: &str = r#"(
        main_tree_to_execute: Some("MainTree"),
        trees: [
            (
                id: "MainTree",
                roots: [
                    (
                        type: "Sequence",
                        name: Some("root"),
                        children: [
                            (type: "SaySomething", ports: {"message": "{greeting}"}),
                            (
                                type: "Repeat",
                                ports: {"num_cycles": "2"},
                                children: [(type: "AlwaysSuccess")],
                            ),
                        ],
                    ),
                ],
            ),
        ],
    )"#;

    #[test]
    fn parses_document() {
        let document = TreeLoader::parse(DOCUMENT).unwrap();
        assert_eq!(document.main_tree_to_execute.as_deref(), Some("MainTree"));

        let root = &document.trees[0].roots[0];
        assert_eq!(root.type_name, "Sequence");
        assert_eq!(root.instance_name(), "root");
        assert_eq!(
            root.children[0].ports["message"],
            PortValue::blackboard("greeting")
        );
        assert_eq!(root.children[1].ports["num_cycles"], PortValue::literal("2"));
        assert_eq!(root.children[1].children.len(), 1);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let document = TreeLoader::load(file.path()).unwrap();
        assert_eq!(document.trees.len(), 1);
    }

    #[test]
    fn reports_missing_file_and_bad_syntax() {
        let err = TreeLoader::load(Path::new("/nonexistent/tree.ron")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));

        let err = TreeLoader::parse("(trees: [").unwrap_err();
        assert!(err.to_string().contains("Failed to parse tree RON"));
    }
}
