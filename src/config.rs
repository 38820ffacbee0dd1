/// Knobs for a bake run. Only diagnostics are configurable; the baked output
/// does not depend on any of these.
#[derive(Clone, Debug)]
pub struct BakeConfig {
    /// Maximum number of tracks dumped at trace level, 0 for no limit.
    pub track_log_limit: usize,
    /// Maximum number of keyframes dumped at trace level, 0 for no limit.
    pub keyframe_log_limit: usize,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            track_log_limit: 500,
            keyframe_log_limit: 500,
        }
    }
}

impl BakeConfig {
    pub(crate) fn within(limit: usize, index: usize) -> bool {
        limit == 0 || index < limit
    }
}
