//! Read-aloud position within the current slide.

use podium_core::split_paragraphs;

/// One paragraph handed out by [`SpokenTextCursor::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenBlock {
    pub text: String,
    /// 0-based paragraph index.
    pub index: usize,
    /// Paragraphs on the slide.
    pub total: usize,
}

/// Tracks which paragraph of the current slide to read next.
///
/// Shared by the speak and repeat capabilities; callers hold it behind a
/// mutex so one reader advances at a time.
#[derive(Debug, Default)]
pub struct SpokenTextCursor {
    current_slide_text: Option<String>,
    position: Option<usize>,
    last_spoken_block: Option<String>,
}

impl SpokenTextCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next paragraph of `slide_text`.
    ///
    /// Restarts from the first paragraph when the slide changed, nothing was
    /// read yet, or the previous paragraph was the last one. `None` when the
    /// slide has no text.
    pub fn advance(&mut self, slide_text: &str) -> Option<SpokenBlock> {
        let paragraphs = split_paragraphs(slide_text);
        if paragraphs.is_empty() {
            return None;
        }

        let same_slide = self.current_slide_text.as_deref() == Some(slide_text);
        let index = match self.position {
            Some(last) if same_slide && last + 1 < paragraphs.len() => last + 1,
            _ => 0,
        };

        let text = paragraphs[index].to_string();
        if !same_slide {
            self.current_slide_text = Some(slide_text.to_string());
        }
        self.position = Some(index);
        self.last_spoken_block = Some(text.clone());

        Some(SpokenBlock {
            text,
            index,
            total: paragraphs.len(),
        })
    }

    /// The most recently spoken paragraph. Does not move the cursor.
    pub fn last_spoken(&self) -> Option<&str> {
        self.last_spoken_block.as_deref()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
