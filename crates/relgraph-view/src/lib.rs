pub mod controller;
pub mod frame;
pub mod navigation;
pub mod selection;
pub mod settings;
pub mod view;

pub use controller::{InputEvent, InteractionController, Key};
pub use frame::{FrameDiff, LinkSprite, NodeSprite, RenderFrame, SpriteState};
pub use navigation::{DEFAULT_HISTORY_CAPACITY, HistoryEntry, NavigationHistory};
pub use selection::SelectionState;
pub use settings::{SettingsError, ViewSettings};
pub use view::GraphView;
