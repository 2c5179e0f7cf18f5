/// Enumerated spatial-index contexts.
/// Pushed onto error stacks to say where in a grid table a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    /// Table-wide, with its level
    Table(u32),
    /// Tile at (row, col)
    Tile(usize, usize),
    /// Track index within a tile's grid
    Track(usize),
    /// Wire by public id
    Wire(u32),
    /// Design or configuration input
    Config(String),
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Table(level) => write!(f, "table(level {})", level),
            Self::Tile(row, col) => write!(f, "tile[{}][{}]", row, col),
            Self::Track(n) => write!(f, "track #{}", n),
            Self::Wire(id) => write!(f, "wire #{}", id),
            Self::Config(what) => write!(f, "config({})", what),
        }
    }
}
