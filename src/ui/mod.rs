pub mod dialog;
pub mod popup;

#[cfg(feature = "egui")]
pub mod widget;

pub use dialog::{Alert, AlertIcon, DialogQueue};
pub use popup::{PopupContent, PopupOverlay, PopupTemplate};

#[cfg(feature = "egui")]
pub use widget::{MapWidget, MapWidgetExt, WidgetResponse};
