//! Content validation, run before any content is sent for persistence.

use crate::{BlockContent, BlockError, BlockType, Location, MAX_PRICE_LEVEL, Result};

/// Check that `content` carries the fields its block type requires.
pub fn validate_content(content: &BlockContent) -> Result<()> {
    let block_type = content.block_type();
    match content {
        BlockContent::Title(c) => {
            if c.text.trim().is_empty() {
                return Err(BlockError::validation(block_type, "title text is empty"));
            }
        }
        BlockContent::Text(_) | BlockContent::Divider(_) => {}
        BlockContent::PhotoText(c) => check_photos(block_type, &c.photos)?,
        BlockContent::Slide(c) => check_photos(block_type, &c.photos)?,
        BlockContent::ThreeColumns(c) => {
            for (i, column) in c.columns.iter().enumerate() {
                if column.photo.as_deref().is_some_and(str::is_empty) {
                    return Err(BlockError::validation(
                        block_type,
                        format!("column {i} has an empty photo uri"),
                    ));
                }
            }
        }
        BlockContent::Photo(c) => check_photos(block_type, &c.photos)?,
        BlockContent::Location(c) => {
            check_location(&c.main_location)?;
            for location in &c.alternative_locations {
                check_location(location)?;
            }
        }
    }
    Ok(())
}

fn check_photos(block_type: BlockType, photos: &[String]) -> Result<()> {
    if let Some(i) = photos.iter().position(|uri| uri.is_empty()) {
        return Err(BlockError::validation(
            block_type,
            format!("photo {i} has an empty uri"),
        ));
    }
    Ok(())
}

fn check_location(location: &Location) -> Result<()> {
    check_photos(BlockType::Location, &location.photos)?;
    if let Some(level) = location.price_level.filter(|level| *level > MAX_PRICE_LEVEL) {
        return Err(BlockError::validation(
            BlockType::Location,
            format!("price_level {level} exceeds {MAX_PRICE_LEVEL}"),
        ));
    }
    Ok(())
}
