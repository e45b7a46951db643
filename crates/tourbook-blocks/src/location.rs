//! Editing a location block's main place and its alternatives.
//!
//! [`LocationEditor`] owns a [`LocationContent`] plus a selection pointer:
//! `None` targets the main location, `Some(i)` targets
//! `alternative_locations[i]`. Edits go to whatever the pointer targets.
//!
//! Promoting an alternative ([`switch_location`]) exchanges content between
//! the main slot and the alternative slot; the pointer does not move. Doing
//! it twice for the same index restores the original content.

use crate::{BlockError, BlockType, Location, LocationContent, Result};

/// Exchange `alternative_locations[index]` with the main location.
pub fn switch_location(content: &mut LocationContent, index: usize) -> Result<()> {
    let len = content.alternative_locations.len();
    let alternative = content
        .alternative_locations
        .get_mut(index)
        .ok_or(BlockError::AlternativeOutOfRange { index, len })?;
    std::mem::swap(&mut content.main_location, alternative);
    Ok(())
}

/// Partial update for a [`Location`].
///
/// `None` leaves a field as it is. For nullable fields, `Some(None)` clears.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationPatch {
    pub time: Option<Option<String>>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub description: Option<Option<String>>,
    pub photos: Option<Vec<String>>,
    pub recommendations: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
    pub price_level: Option<Option<u8>>,
    pub approx_cost: Option<Option<String>>,
    pub city_id: Option<Option<String>>,
    pub city_name: Option<Option<String>>,
}

impl LocationPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Merge this patch into `location`.
    pub fn apply_to(self, location: &mut Location) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut location.time, self.time);
        set(&mut location.title, self.title);
        set(&mut location.address, self.address);
        set(&mut location.description, self.description);
        set(&mut location.photos, self.photos);
        set(&mut location.recommendations, self.recommendations);
        set(&mut location.category, self.category);
        set(&mut location.interests, self.interests);
        set(&mut location.price_level, self.price_level);
        set(&mut location.approx_cost, self.approx_cost);
        set(&mut location.city_id, self.city_id);
        set(&mut location.city_name, self.city_name);
    }
}

/// Location content under edit, with the selected-location pointer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationEditor {
    content: LocationContent,
    selected: Option<usize>,
}

impl LocationEditor {
    /// Start editing `content` with the main location selected.
    pub fn new(content: LocationContent) -> Self {
        Self {
            content,
            selected: None,
        }
    }

    pub fn content(&self) -> &LocationContent {
        &self.content
    }

    pub fn into_content(self) -> LocationContent {
        self.content
    }

    /// `None` = main location, `Some(i)` = alternative `i`.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, selected: Option<usize>) -> Result<()> {
        if let Some(index) = selected {
            self.check_index(index)?;
        }
        self.selected = selected;
        Ok(())
    }

    /// The location edits currently apply to.
    pub fn current(&self) -> &Location {
        match self.selected {
            Some(i) => &self.content.alternative_locations[i],
            None => &self.content.main_location,
        }
    }

    fn current_mut(&mut self) -> &mut Location {
        match self.selected {
            Some(i) => &mut self.content.alternative_locations[i],
            None => &mut self.content.main_location,
        }
    }

    /// Append a default alternative and select it. Returns its index.
    pub fn add_alternative(&mut self) -> usize {
        self.content.alternative_locations.push(Location::default());
        let index = self.content.alternative_locations.len() - 1;
        self.selected = Some(index);
        index
    }

    /// Remove alternative `index`, keeping the pointer on the same logical item.
    pub fn remove_alternative(&mut self, index: usize) -> Result<Location> {
        self.check_index(index)?;
        let removed = self.content.alternative_locations.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Ok(removed)
    }

    pub fn update_current(&mut self, patch: LocationPatch) {
        patch.apply_to(self.current_mut());
    }

    /// Attach a photo URI to the selected location.
    pub fn push_photo(&mut self, uri: impl Into<String>) -> Result<()> {
        let uri = uri.into();
        if uri.is_empty() {
            return Err(BlockError::validation(BlockType::Location, "photo uri is empty"));
        }
        self.current_mut().photos.push(uri);
        Ok(())
    }

    /// Promote alternative `index` to be the main location.
    pub fn switch_location(&mut self, index: usize) -> Result<()> {
        switch_location(&mut self.content, index)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.content.alternative_locations.len();
        if index >= len {
            return Err(BlockError::AlternativeOutOfRange { index, len });
        }
        Ok(())
    }
}
