//! State root: a 32-byte commitment to the complete world state.

use super::WorldState;

/// SHA-256 over the bincode encoding of the whole world.
///
/// Two runs from the same seed and action sequence produce the same root,
/// which is how replays are checked for divergence.
pub fn state_root(state: &WorldState) -> [u8; 32] {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    // BTreeMap registries keep the encoding order stable
    if let Ok(bytes) = bincode::serialize(state) {
        hasher.update(&bytes);
    }
    hasher.finalize().into()
}
