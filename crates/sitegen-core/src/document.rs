//! The ordered block document.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockName};

const SCAFFOLD_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Your Website</title>
</head>
<body>
"#;

const SCAFFOLD_ANCHOR: &str = "</body>\n</html>\n";

/// Errors from document mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("Block index {index} out of range for document of length {len}")]
    OutOfRange { index: usize, len: usize },
}

/// An ordered sequence of blocks forming one page.
///
/// Concatenating block contents in order yields the rendered page. The value
/// also carries the id counter, so a cloned snapshot restores exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
    next_id: u64,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starter page: an opening head block and a closing anchor.
    pub fn scaffold() -> Self {
        let mut doc = Self::new();
        doc.push(BlockName::Head, SCAFFOLD_HEAD);
        doc.push(BlockName::Anchor, SCAFFOLD_ANCHOR);
        doc
    }

    /// Build a document from `(name, content)` pairs, assigning fresh ids.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = (BlockName, S)>,
        S: Into<String>,
    {
        let mut doc = Self::new();
        for (name, content) in parts {
            doc.push(name, content);
        }
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Replace the whole block sequence.
    ///
    /// The id counter only moves forward, so ids stay unique against
    /// blocks handed out earlier.
    pub fn replace(&mut self, blocks: Vec<Block>) {
        let max_id = blocks.iter().map(|b| b.id + 1).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id);
        self.blocks = blocks;
    }

    /// Insert a new block at `index` (which may equal `len`).
    pub fn insert_at(
        &mut self,
        index: usize,
        name: BlockName,
        content: impl Into<String>,
    ) -> Result<usize, DocumentError> {
        if index > self.blocks.len() {
            return Err(self.out_of_range(index));
        }
        let block = self.new_block(name, content.into());
        self.blocks.insert(index, block);
        Ok(index)
    }

    /// Insert a new block immediately before the trailing anchor.
    ///
    /// Returns the index of the inserted block. An empty document has no
    /// anchor, so the block lands at index 0.
    pub fn insert_before_anchor(&mut self, name: BlockName, content: impl Into<String>) -> usize {
        let index = self.blocks.len().saturating_sub(1);
        let block = self.new_block(name, content.into());
        self.blocks.insert(index, block);
        index
    }

    /// Replace the content of the block at `index`, keeping its id and name.
    pub fn update_at(
        &mut self,
        index: usize,
        content: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let len = self.blocks.len();
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(DocumentError::OutOfRange { index, len })?;
        block.content = content.into();
        Ok(())
    }

    /// Overwrite index 0 with a head block, or insert one into an empty document.
    pub fn set_head(&mut self, content: impl Into<String>) {
        let block = self.new_block(BlockName::Head, content.into());
        match self.blocks.first_mut() {
            Some(first) => *first = block,
            None => self.blocks.push(block),
        }
    }

    /// Move the block at `from` so that it ends up at `to`.
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        if from >= self.blocks.len() {
            return Err(self.out_of_range(from));
        }
        if to >= self.blocks.len() {
            return Err(self.out_of_range(to));
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        Ok(())
    }

    /// Concatenated HTML of every block, in order.
    pub fn code(&self) -> String {
        self.blocks.iter().map(|b| b.content.as_str()).collect()
    }

    fn push(&mut self, name: BlockName, content: impl Into<String>) {
        let block = self.new_block(name, content.into());
        self.blocks.push(block);
    }

    fn new_block(&mut self, name: BlockName, content: String) -> Block {
        let id = self.next_id;
        self.next_id += 1;
        Block { id, name, content }
    }

    fn out_of_range(&self, index: usize) -> DocumentError {
        DocumentError::OutOfRange {
            index,
            len: self.blocks.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(doc: &Document) -> Vec<BlockName> {
        doc.blocks().iter().map(|b| b.name).collect()
    }

    #[test]
    fn inserts_footer_before_anchor() {
        let mut doc = Document::scaffold();

        let index = doc.insert_before_anchor(BlockName::Footer, "<footer></footer>");

        assert_eq!(index, 1);
        assert_eq!(
            names(&doc),
            vec![BlockName::Head, BlockName::Footer, BlockName::Anchor]
        );
    }

    #[test]
    fn anchor_stays_last_after_many_insertions() {
        let mut doc = Document::scaffold();
        let original = doc.len();

        for name in BlockName::ADDABLE {
            doc.insert_before_anchor(name, name.as_str());
        }

        assert_eq!(doc.len(), original + BlockName::ADDABLE.len());
        assert_eq!(doc.blocks().last().map(|b| b.name), Some(BlockName::Anchor));
    }

    #[test]
    fn insert_into_empty_document_lands_at_zero() {
        let mut doc = Document::new();
        assert_eq!(doc.insert_before_anchor(BlockName::Map, "<div></div>"), 0);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let mut doc = Document::scaffold();
        doc.insert_before_anchor(BlockName::Navigation, "");
        doc.insert_before_anchor(BlockName::Navigation, "");
        doc.set_head("<head></head>");

        let mut ids: Vec<u64> = doc.blocks().iter().map(|b| b.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), doc.len());
    }

    #[test]
    fn set_head_overwrites_index_zero() {
        let mut doc = Document::from_parts([
            (BlockName::Navigation, "<nav></nav>"),
            (BlockName::Anchor, "</body>"),
        ]);

        doc.set_head("<head></head>");

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.blocks()[0].name, BlockName::Head);
        assert_eq!(doc.code(), "<head></head></body>");
    }

    #[test]
    fn set_head_on_empty_document_inserts() {
        let mut doc = Document::new();
        doc.set_head("<head></head>");
        assert_eq!(names(&doc), vec![BlockName::Head]);
    }

    #[test]
    fn update_keeps_length_and_identity() {
        let mut doc = Document::scaffold();
        let index = doc.insert_before_anchor(BlockName::MainSection, "old");
        let id = doc.blocks()[index].id;

        doc.update_at(index, "new").unwrap();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.blocks()[index].id, id);
        assert_eq!(doc.blocks()[index].content, "new");
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mut doc = Document::scaffold();

        assert_eq!(
            doc.update_at(5, "x"),
            Err(DocumentError::OutOfRange { index: 5, len: 2 })
        );
        assert!(doc.move_block(0, 2).is_err());
        assert!(doc.insert_at(3, BlockName::Map, "").is_err());
        assert!(doc.insert_at(2, BlockName::Map, "").is_ok());
    }

    #[test]
    fn moves_blocks() {
        let mut doc = Document::from_parts([
            (BlockName::Head, "a"),
            (BlockName::Navigation, "b"),
            (BlockName::Footer, "c"),
            (BlockName::Anchor, "d"),
        ]);

        doc.move_block(2, 1).unwrap();

        assert_eq!(doc.code(), "acbd");
    }

    #[test]
    fn replace_keeps_ids_unique() {
        let mut doc = Document::scaffold();
        let kept = doc.blocks()[1..].to_vec();

        doc.replace(kept);
        doc.insert_before_anchor(BlockName::Footer, "");

        assert_ne!(doc.blocks()[0].id, doc.blocks()[1].id);
    }

    #[test]
    fn scaffold_is_a_complete_page() {
        let code = Document::scaffold().code();
        assert!(code.starts_with("<!DOCTYPE html>"));
        assert!(code.trim_end().ends_with("</html>"));
    }
}
