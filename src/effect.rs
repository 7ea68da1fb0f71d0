//! Effects - side effects declared by the reducer

use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Walk every listing page to build the search index.
    LoadIndex { page_size: u32 },
    LoadPage { limit: u32, offset: u32, append: bool },
    /// Restart the quiet-period timer for the raw search text.
    SettleSearch { text: String, delay: Duration },
    /// Fetch candidates in order until more than `cap` results are held.
    RunSearch {
        generation: u64,
        candidates: Vec<String>,
        cap: usize,
    },
    LoadDetail { url: String },
    LoadSprite { id: String },
    /// Fetch the image from the record's own sprite URL.
    LoadSpriteAt { id: String, url: String },
}
