use crate::outputs::report::ReportData;

/// What the engine asks its driver to do. The engine itself never touches a display.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Log(String),
    Render(ReportData),
}
