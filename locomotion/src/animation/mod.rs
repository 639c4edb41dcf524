/*!
Animation layer model and the per-tick destination-state resolver.

- layer:    [`AnimationLayer`] and [`LayerMask`]
- request:  [`StateRequest`] (what a source wants) and [`Crossfade`] (what the player gets)
- state_id: hashed state identities and the per-character name cache
- player:   the [`AnimationPlayer`] and [`ItemStates`] collaborator traits
- resolver: precedence, replay suppression, duration normalization, layer sync
*/

pub mod layer;
pub mod player;
pub mod request;
pub mod resolver;
pub mod state_id;

pub use layer::{AnimationLayer, LAYER_COUNT, LayerMask};
pub use player::{AnimationPlayer, AnimatorParameters, ItemStates, NoItems, RootMotion};
pub use request::{Crossfade, StateRequest};
pub use resolver::{AnimationLayerResolver, RequestSource};
pub use state_id::{StateId, StateNameCache};
