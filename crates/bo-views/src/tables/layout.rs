//! Canonical column list and the frozen/scrollable partition derived from it

use std::path::Path;

use bo_core::ColumnDefinition;
use serde::{Deserialize, Serialize};

use crate::ViewError;

/// Derived rendering view; rebuilt whenever the canonical list changes
#[derive(Debug, Clone, Default, PartialEq)]
struct Partition {
    /// Indices into the canonical list, sorted by `order`
    frozen: Vec<usize>,
    scrollable: Vec<usize>,
    /// Sticky left offset of each frozen column, parallel to `frozen`
    offsets: Vec<f32>,
    frozen_width: f32,
}

impl Partition {
    fn build(columns: &[ColumnDefinition]) -> Self {
        let mut frozen: Vec<usize> = Vec::new();
        let mut scrollable: Vec<usize> = Vec::new();
        for (index, column) in columns.iter().enumerate() {
            if !column.is_shown() {
                continue;
            }
            if column.frozen {
                frozen.push(index);
            } else {
                scrollable.push(index);
            }
        }
        frozen.sort_by_key(|&i| columns[i].order);
        scrollable.sort_by_key(|&i| columns[i].order);

        let mut offsets = Vec::with_capacity(frozen.len());
        let mut frozen_width = 0.0;
        for &i in &frozen {
            offsets.push(frozen_width);
            frozen_width += columns[i].width;
        }

        Self {
            frozen,
            scrollable,
            offsets,
            frozen_width,
        }
    }
}

/// Serialized form of a layout
#[derive(Debug, Serialize, Deserialize)]
struct LayoutFile {
    columns: Vec<ColumnDefinition>,
}

/// Owns the table's column descriptors.
///
/// Frozen columns are pinned left in `order`, each offset by the widths of
/// the frozen columns before it; scrollable columns follow in `order`.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    columns: Vec<ColumnDefinition>,
    partition: Partition,
    revision: u64,
}

impl ColumnLayout {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        let mut layout = Self {
            columns: Vec::new(),
            partition: Partition::default(),
            revision: 0,
        };
        layout.replace(columns);
        layout
    }

    fn replace(&mut self, mut columns: Vec<ColumnDefinition>) {
        for column in &mut columns {
            normalize(column);
        }
        self.columns = columns;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.partition = Partition::build(&self.columns);
        self.revision += 1;
    }

    /// Bumped on every change; lets callers cache anything derived from the layout
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn frozen_columns(&self) -> impl Iterator<Item = &ColumnDefinition> + '_ {
        self.partition.frozen.iter().map(|&i| &self.columns[i])
    }

    pub fn scrollable_columns(&self) -> impl Iterator<Item = &ColumnDefinition> + '_ {
        self.partition.scrollable.iter().map(|&i| &self.columns[i])
    }

    /// Frozen columns paired with their sticky left offsets
    pub fn frozen_with_offsets(&self) -> impl Iterator<Item = (&ColumnDefinition, f32)> + '_ {
        self.frozen_columns().zip(self.partition.offsets.iter().copied())
    }

    /// Sticky offset of a frozen column; `None` for scrollable or hidden ones
    pub fn frozen_offset(&self, id: &str) -> Option<f32> {
        self.frozen_with_offsets()
            .find(|(column, _)| column.id == id)
            .map(|(_, offset)| offset)
    }

    /// Combined width of the sticky region
    pub fn frozen_width(&self) -> f32 {
        self.partition.frozen_width
    }

    pub fn visible_count(&self) -> usize {
        self.partition.frozen.len() + self.partition.scrollable.len()
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), ViewError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ViewError::UnknownColumn(id.to_string()))?;
        if column.required && !visible {
            return Err(ViewError::RequiredColumn(id.to_string()));
        }
        if column.visible != visible {
            column.visible = visible;
            self.rebuild();
        }
        Ok(())
    }

    /// Resize a column, never below its minimum; returns the applied width
    pub fn set_width(&mut self, id: &str, width: f32) -> Result<f32, ViewError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ViewError::UnknownColumn(id.to_string()))?;
        let width = if width.is_finite() {
            width.max(column.min_width)
        } else {
            column.width
        };
        if column.width != width {
            column.width = width;
            self.rebuild();
        }
        Ok(width)
    }

    /// Replace the canonical list, e.g. with the result of a customization
    pub fn commit(&mut self, columns: Vec<ColumnDefinition>) {
        self.replace(columns);
        tracing::info!(
            visible = self.visible_count(),
            frozen = self.partition.frozen.len(),
            "column layout committed"
        );
    }

    pub fn to_json(&self) -> Result<String, ViewError> {
        let file = LayoutFile {
            columns: self.columns.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        let file: LayoutFile = serde_json::from_str(json)?;
        Ok(Self::new(file.columns))
    }

    pub fn save(&self, path: &Path) -> Result<(), ViewError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ViewError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(bo_core::model::default_columns())
    }
}

fn normalize(column: &mut ColumnDefinition) {
    if column.required {
        column.visible = true;
    }
    if !column.width.is_finite() || column.width < column.min_width {
        column.width = column.min_width;
    }
}
