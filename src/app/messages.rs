use crate::display::{Layout, Output, ScaleFactor};

#[derive(Clone, Debug, PartialEq)]
pub enum AppMsg {
    // Menu actions
    FixExternal,
    SetLayout(Layout),
    SetScale(Output, ScaleFactor),
    EnableExternal,
    DisableExternal,
    Quit,

    /// Sent by the udev listener when a DRM device changed
    HotplugDetected,
}
