//! Default content for each block type.
//!
//! Every default is already canonical: normalizing or re-decoding it yields
//! the same value.

use crate::{
    BlockContent, BlockType, DividerContent, LocationContent, PhotoContent, PhotoTextContent,
    SlideContent, TextContent, ThreeColumnsContent, TitleContent,
};

/// Content a freshly added block of `block_type` starts with.
pub fn default_content(block_type: BlockType) -> BlockContent {
    match block_type {
        BlockType::Title => BlockContent::Title(TitleContent::default()),
        BlockType::Text => BlockContent::Text(TextContent {
            text: Some(String::new()),
            ..TextContent::default()
        }),
        BlockType::PhotoText => BlockContent::PhotoText(PhotoTextContent::default()),
        BlockType::Slide => BlockContent::Slide(SlideContent::default()),
        BlockType::ThreeColumns => BlockContent::ThreeColumns(ThreeColumnsContent::default()),
        BlockType::Photo => BlockContent::Photo(PhotoContent::default()),
        BlockType::Divider => BlockContent::Divider(DividerContent::default()),
        BlockType::Location => BlockContent::Location(LocationContent::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_content;

    #[test]
    fn test_every_type_has_a_default_of_that_type() {
        for t in BlockType::ALL {
            assert_eq!(default_content(t).block_type(), t);
        }
    }

    #[test]
    fn test_defaults_are_canonical() {
        for t in BlockType::ALL {
            let content = default_content(t);
            let normalized = normalize_content(t, &content.to_json());
            assert_eq!(normalized, content, "{t} default changed under normalization");
        }
    }

    #[test]
    fn test_location_default_has_no_alternatives() {
        let content = default_content(BlockType::Location);
        let location = content.as_location().unwrap();
        assert!(location.alternative_locations.is_empty());
        assert_eq!(location.main_location.title, "");
        assert!(location.main_location.photos.is_empty());
    }

    #[test]
    fn test_default_is_deterministic() {
        for t in BlockType::ALL {
            assert_eq!(default_content(t), default_content(t));
        }
    }
}
