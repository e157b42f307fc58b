//! Clip and overlay selection.

/// Selected clip ids and overlay ids. At most one of the two sets is
/// non-empty at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    clips: Vec<String>,
    overlays: Vec<String>,
}

impl Selection {
    /// Select a clip. Single-select replaces everything; multi-select toggles
    /// `id` within the clip set. Either way the overlay set is cleared.
    pub fn select_clip(&mut self, id: &str, multi: bool) {
        self.overlays.clear();
        toggle(&mut self.clips, id, multi);
    }

    /// Overlay counterpart of [`Selection::select_clip`].
    pub fn select_overlay(&mut self, id: &str, multi: bool) {
        self.clips.clear();
        toggle(&mut self.overlays, id, multi);
    }

    pub fn clear(&mut self) {
        self.clips.clear();
        self.overlays.clear();
    }

    pub fn clips(&self) -> &[String] {
        &self.clips
    }

    pub fn overlays(&self) -> &[String] {
        &self.overlays
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty() && self.overlays.is_empty()
    }

    pub fn contains_clip(&self, id: &str) -> bool {
        self.clips.iter().any(|c| c == id)
    }

    pub fn contains_overlay(&self, id: &str) -> bool {
        self.overlays.iter().any(|o| o == id)
    }

    /// Replace the selection with freshly pasted clips.
    pub(crate) fn set_clips(&mut self, ids: Vec<String>) {
        self.overlays.clear();
        self.clips = ids;
    }

    pub(crate) fn set_overlays(&mut self, ids: Vec<String>) {
        self.clips.clear();
        self.overlays = ids;
    }

    /// Drop ids that no longer exist.
    pub(crate) fn retain(
        &mut self,
        clip_exists: impl Fn(&str) -> bool,
        overlay_exists: impl Fn(&str) -> bool,
    ) {
        self.clips.retain(|id| clip_exists(id));
        self.overlays.retain(|id| overlay_exists(id));
    }
}

fn toggle(set: &mut Vec<String>, id: &str, multi: bool) {
    if !multi {
        set.clear();
        set.push(id.to_string());
        return;
    }
    if let Some(pos) = set.iter().position(|s| s == id) {
        set.remove(pos);
    } else {
        set.push(id.to_string());
    }
}
