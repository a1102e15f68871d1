//! Table dialect definitions
//!
//! A [`CalsTableDefinition`] names every element, attribute and token the
//! engines read or write, so the same grammar can be used under any
//! namespace or vocabulary. [`TableStructure`] is the seam through which a
//! dialect maps its markup to a grid model.

use crate::core::cals2grid;
use crate::core::grid2cals;
use crate::data::constants as names;
use crate::dom::{NodeId, TableHost};
use crate::features::grid::{GridModel, HorizontalAlignment, VerticalAlignment};
use crate::utils::error::TableResult;

/// Element local names
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CalsElementNames {
    pub table: String,
    pub tgroup: String,
    pub colspec: String,
    pub thead: String,
    pub tbody: String,
    pub tfoot: String,
    pub row: String,
    pub entry: String,
}

impl Default for CalsElementNames {
    fn default() -> Self {
        Self {
            table: names::TABLE.to_string(),
            tgroup: names::TGROUP.to_string(),
            colspec: names::COLSPEC.to_string(),
            thead: names::THEAD.to_string(),
            tbody: names::TBODY.to_string(),
            tfoot: names::TFOOT.to_string(),
            row: names::ROW.to_string(),
            entry: names::ENTRY.to_string(),
        }
    }
}

/// Attribute names
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CalsAttributeNames {
    pub frame: String,
    pub cols: String,
    pub colname: String,
    pub colnum: String,
    pub colwidth: String,
    pub colsep: String,
    pub rowsep: String,
    pub align: String,
    pub valign: String,
    pub namest: String,
    pub nameend: String,
    pub morerows: String,
    pub outputclass: String,
}

impl Default for CalsAttributeNames {
    fn default() -> Self {
        Self {
            frame: names::FRAME.to_string(),
            cols: names::COLS.to_string(),
            colname: names::COLNAME.to_string(),
            colnum: names::COLNUM.to_string(),
            colwidth: names::COLWIDTH.to_string(),
            colsep: names::COLSEP.to_string(),
            rowsep: names::ROWSEP.to_string(),
            align: names::ALIGN.to_string(),
            valign: names::VALIGN.to_string(),
            namest: names::NAMEST.to_string(),
            nameend: names::NAMEEND.to_string(),
            morerows: names::MOREROWS.to_string(),
            outputclass: names::OUTPUTCLASS.to_string(),
        }
    }
}

/// Attribute value literals
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CalsTokens {
    pub yes: String,
    pub no: String,
    pub frame_on: String,
    pub frame_off: String,
    pub left: String,
    pub right: String,
    pub center: String,
    pub justify: String,
    pub char: String,
    pub top: String,
    pub middle: String,
    pub bottom: String,
}

impl Default for CalsTokens {
    fn default() -> Self {
        Self {
            yes: names::YES.to_string(),
            no: names::NO.to_string(),
            frame_on: names::FRAME_ALL.to_string(),
            frame_off: names::FRAME_NONE.to_string(),
            left: names::ALIGN_LEFT.to_string(),
            right: names::ALIGN_RIGHT.to_string(),
            center: names::ALIGN_CENTER.to_string(),
            justify: names::ALIGN_JUSTIFY.to_string(),
            char: names::ALIGN_CHAR.to_string(),
            top: names::VALIGN_TOP.to_string(),
            middle: names::VALIGN_MIDDLE.to_string(),
            bottom: names::VALIGN_BOTTOM.to_string(),
        }
    }
}

/// Configuration of one CALS table dialect
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CalsTableDefinition {
    /// Namespace URI shared by all table elements
    pub namespace: Option<String>,
    pub elements: CalsElementNames,
    pub attributes: CalsAttributeNames,
    pub tokens: CalsTokens,
    /// Width of columns the source leaves undeclared
    pub default_column_width: String,
    /// Rename every column to `column-<index>` while building
    pub normalize_column_names: bool,
}

impl Default for CalsTableDefinition {
    fn default() -> Self {
        Self {
            namespace: None,
            elements: CalsElementNames::default(),
            attributes: CalsAttributeNames::default(),
            tokens: CalsTokens::default(),
            default_column_width: names::DEFAULT_COLUMN_WIDTH.to_string(),
            normalize_column_names: false,
        }
    }
}

impl CalsTableDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables whose elements live in a namespace
    pub fn with_namespace(uri: &str) -> Self {
        Self {
            namespace: Some(uri.to_string()),
            ..Default::default()
        }
    }

    /// Use other literals for separator flags, e.g. `yes`/`no`
    pub fn with_separator_tokens(mut self, yes: &str, no: &str) -> Self {
        self.tokens.yes = yes.to_string();
        self.tokens.no = no.to_string();
        self
    }

    /// Use other literals for the table frame flag
    pub fn with_frame_tokens(mut self, on: &str, off: &str) -> Self {
        self.tokens.frame_on = on.to_string();
        self.tokens.frame_off = off.to_string();
        self
    }

    pub fn with_normalized_column_names(mut self) -> Self {
        self.normalize_column_names = true;
        self
    }

    /// Load a definition from TOML; omitted fields keep their defaults
    #[cfg(feature = "config")]
    pub fn from_toml_str(source: &str) -> TableResult<Self> {
        toml::from_str(source).map_err(|e| {
            crate::utils::error::TableError::invalid_attribute("definition", e.to_string())
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether `node` is the element with local name `local_name` in this
    /// dialect's namespace
    pub fn is<H: TableHost + ?Sized>(&self, host: &H, node: NodeId, local_name: &str) -> bool {
        host.is_element(node, self.namespace(), local_name)
    }

    pub fn parse_separator(&self, value: &str) -> Option<bool> {
        let value = value.trim();
        if value == self.tokens.yes {
            Some(true)
        } else if value == self.tokens.no {
            Some(false)
        } else {
            log::warn!("ignoring unrecognized separator value '{}'", value);
            None
        }
    }

    pub fn separator_token(&self, on: bool) -> &str {
        if on {
            &self.tokens.yes
        } else {
            &self.tokens.no
        }
    }

    /// Frame value to border flag. Anything but the "off" token draws a frame.
    pub fn parse_frame(&self, value: &str) -> bool {
        value.trim() != self.tokens.frame_off
    }

    pub fn frame_token(&self, borders: bool) -> &str {
        if borders {
            &self.tokens.frame_on
        } else {
            &self.tokens.frame_off
        }
    }

    pub fn parse_alignment(&self, value: &str) -> Option<HorizontalAlignment> {
        let t = &self.tokens;
        let value = value.trim();
        let parsed = [
            (&t.left, HorizontalAlignment::Left),
            (&t.right, HorizontalAlignment::Right),
            (&t.center, HorizontalAlignment::Center),
            (&t.justify, HorizontalAlignment::Justify),
            (&t.char, HorizontalAlignment::Char),
        ]
        .into_iter()
        .find(|(token, _)| token.as_str() == value)
        .map(|(_, alignment)| alignment);
        if parsed.is_none() {
            log::warn!("ignoring unrecognized alignment '{}'", value);
        }
        parsed
    }

    pub fn alignment_token(&self, alignment: HorizontalAlignment) -> &str {
        match alignment {
            HorizontalAlignment::Left => &self.tokens.left,
            HorizontalAlignment::Right => &self.tokens.right,
            HorizontalAlignment::Center => &self.tokens.center,
            HorizontalAlignment::Justify => &self.tokens.justify,
            HorizontalAlignment::Char => &self.tokens.char,
        }
    }

    pub fn parse_vertical_alignment(&self, value: &str) -> Option<VerticalAlignment> {
        let value = value.trim();
        if value == self.tokens.top {
            Some(VerticalAlignment::Top)
        } else if value == self.tokens.middle {
            Some(VerticalAlignment::Middle)
        } else if value == self.tokens.bottom {
            Some(VerticalAlignment::Bottom)
        } else {
            log::warn!("ignoring unrecognized vertical alignment '{}'", value);
            None
        }
    }

    pub fn vertical_alignment_token(&self, alignment: VerticalAlignment) -> &str {
        match alignment {
            VerticalAlignment::Top => &self.tokens.top,
            VerticalAlignment::Middle => &self.tokens.middle,
            VerticalAlignment::Bottom => &self.tokens.bottom,
        }
    }
}

/// How a table dialect maps its markup to a grid model
pub trait TableStructure {
    /// Whether `node` is the root element of a table in this dialect
    fn is_table<H: TableHost + ?Sized>(&self, host: &H, node: NodeId) -> bool;

    /// Build a validated grid model from a table root
    fn build_grid_model<H: TableHost + ?Sized>(
        &self,
        host: &H,
        table: NodeId,
    ) -> TableResult<GridModel>;

    /// Write a grid model back into a table root.
    ///
    /// Returns `Ok(false)` when the host rejected the result; the tree and
    /// the grid are then left as they were.
    fn apply_grid_model<H: TableHost + ?Sized>(
        &self,
        grid: &mut GridModel,
        host: &mut H,
        table: NodeId,
    ) -> TableResult<bool>;

    /// The nearest table root at or above `node`
    fn find_table_root<H: TableHost + ?Sized>(&self, host: &H, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.is_table(host, candidate) {
                return Some(candidate);
            }
            current = host.parent(candidate);
        }
        None
    }

    /// Every table root below `node`, in document order
    fn find_tables<H: TableHost + ?Sized>(&self, host: &H, node: NodeId) -> Vec<NodeId> {
        let mut tables = Vec::new();
        let mut stack = vec![node];
        while let Some(next) = stack.pop() {
            if self.is_table(host, next) {
                tables.push(next);
            }
            stack.extend(host.element_children(next).into_iter().rev());
        }
        tables
    }
}

/// The CALS dialect
#[derive(Debug, Clone, Default)]
pub struct CalsTableStructure {
    pub definition: CalsTableDefinition,
}

impl CalsTableStructure {
    pub fn new(definition: CalsTableDefinition) -> Self {
        Self { definition }
    }
}

impl TableStructure for CalsTableStructure {
    fn is_table<H: TableHost + ?Sized>(&self, host: &H, node: NodeId) -> bool {
        self.definition.is(host, node, &self.definition.elements.table)
    }

    fn build_grid_model<H: TableHost + ?Sized>(
        &self,
        host: &H,
        table: NodeId,
    ) -> TableResult<GridModel> {
        cals2grid::build_grid_model(host, table, &self.definition)
    }

    fn apply_grid_model<H: TableHost + ?Sized>(
        &self,
        grid: &mut GridModel,
        host: &mut H,
        table: NodeId,
    ) -> TableResult<bool> {
        grid2cals::apply_grid_model(grid, host, table, &self.definition)
    }
}
