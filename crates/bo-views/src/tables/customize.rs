//! Working copy behind the column customization dialog.
//!
//! Drag-and-drop is split in two steps: [`compute_insertion_plan`] turns a
//! drag source and the pointer position into an [`InsertionPlan`] without
//! touching any list, and [`ColumnCustomizer::apply`] performs the move as
//! one list update when the column is dropped.

use bo_core::model::CAMPAIGN_COLUMN;
use bo_core::ColumnDefinition;
use serde::{Deserialize, Serialize};

use crate::ViewError;

/// One list of the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Frozen,
    Scrollable,
    Hidden,
}

/// The column being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSource {
    pub section: Section,
    pub index: usize,
}

/// Where the pointer currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerTarget {
    pub section: Section,
    /// Item under the pointer; `None` over empty space or an empty section
    pub hovered_index: Option<usize>,
    /// Pointer is over the upper half of the hovered item
    pub upper_half: bool,
}

/// A validated move. `index` is the position in the target list after the
/// column has been taken out of its source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPlan {
    pub column_id: String,
    pub from: DragSource,
    pub to: Section,
    pub index: usize,
}

/// The three lists shown by the dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLists {
    pub frozen: Vec<ColumnDefinition>,
    pub scrollable: Vec<ColumnDefinition>,
    pub hidden: Vec<ColumnDefinition>,
}

impl ColumnLists {
    pub fn get(&self, section: Section) -> &[ColumnDefinition] {
        match section {
            Section::Frozen => &self.frozen,
            Section::Scrollable => &self.scrollable,
            Section::Hidden => &self.hidden,
        }
    }

    fn get_mut(&mut self, section: Section) -> &mut Vec<ColumnDefinition> {
        match section {
            Section::Frozen => &mut self.frozen,
            Section::Scrollable => &mut self.scrollable,
            Section::Hidden => &mut self.hidden,
        }
    }

    /// Locate a column by id
    pub fn position(&self, id: &str) -> Option<(Section, usize)> {
        [Section::Frozen, Section::Scrollable, Section::Hidden]
            .into_iter()
            .find_map(|section| {
                self.get(section)
                    .iter()
                    .position(|c| c.id == id)
                    .map(|index| (section, index))
            })
    }
}

/// Work out where a drop would land. Returns `None` when the drop would
/// change nothing or is not allowed (a required column dropped on the
/// hidden list, or a stale source index).
pub fn compute_insertion_plan(
    source: DragSource,
    pointer: &PointerTarget,
    lists: &ColumnLists,
) -> Option<InsertionPlan> {
    let column = lists.get(source.section).get(source.index)?;
    if pointer.section == Section::Hidden && column.required {
        return None;
    }

    let target_len = lists.get(pointer.section).len();
    let mut index = match pointer.hovered_index {
        Some(hovered) if pointer.upper_half => hovered,
        Some(hovered) => hovered + 1,
        None => target_len,
    }
    .min(target_len);

    if pointer.section == source.section {
        if index > source.index {
            index -= 1;
        }
        if index == source.index {
            return None;
        }
    }

    Some(InsertionPlan {
        column_id: column.id.clone(),
        from: source,
        to: pointer.section,
        index,
    })
}

/// Column customization session over a copy of the layout
#[derive(Debug, Clone)]
pub struct ColumnCustomizer {
    lists: ColumnLists,
}

impl ColumnCustomizer {
    /// Split a column list into the dialog's three sections, each in `order`
    pub fn new(columns: &[ColumnDefinition]) -> Self {
        let mut sorted: Vec<ColumnDefinition> = columns.to_vec();
        sorted.sort_by_key(|c| c.order);

        let mut lists = ColumnLists::default();
        for column in sorted {
            let section = if !column.is_shown() {
                Section::Hidden
            } else if column.frozen {
                Section::Frozen
            } else {
                Section::Scrollable
            };
            lists.get_mut(section).push(column);
        }
        Self { lists }
    }

    pub fn lists(&self) -> &ColumnLists {
        &self.lists
    }

    /// Plan a drop against the current lists
    pub fn plan(&self, source: DragSource, pointer: &PointerTarget) -> Option<InsertionPlan> {
        compute_insertion_plan(source, pointer, &self.lists)
    }

    /// Perform a planned move. Fails if the lists changed since planning.
    pub fn apply(&mut self, plan: &InsertionPlan) -> Result<(), ViewError> {
        let matches = self
            .lists
            .get(plan.from.section)
            .get(plan.from.index)
            .map_or(false, |c| c.id == plan.column_id);
        if !matches {
            return Err(ViewError::StalePlan(plan.column_id.clone()));
        }

        let column = self.lists.get_mut(plan.from.section).remove(plan.from.index);
        let target = self.lists.get_mut(plan.to);
        let index = plan.index.min(target.len());
        target.insert(index, column);
        Ok(())
    }

    /// Show a hidden column at the end of the scrollable list
    pub fn add_column(&mut self, id: &str) -> Result<(), ViewError> {
        match self.lists.position(id) {
            Some((Section::Hidden, index)) => {
                let column = self.lists.hidden.remove(index);
                self.lists.scrollable.push(column);
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(ViewError::UnknownColumn(id.to_string())),
        }
    }

    /// Hide a visible column
    pub fn remove_column(&mut self, id: &str) -> Result<(), ViewError> {
        let (section, index) = self
            .lists
            .position(id)
            .ok_or_else(|| ViewError::UnknownColumn(id.to_string()))?;
        if section == Section::Hidden {
            return Ok(());
        }
        if self.lists.get(section)[index].required {
            return Err(ViewError::RequiredColumn(id.to_string()));
        }
        let column = self.lists.get_mut(section).remove(index);
        self.lists.hidden.push(column);
        Ok(())
    }

    /// Produce the column list to commit: `order` follows the final
    /// positions (frozen, then scrollable, then hidden), required columns
    /// are shown and a visible campaign column is frozen.
    pub fn save(mut self) -> Vec<ColumnDefinition> {
        let mut index = 0;
        while index < self.lists.hidden.len() {
            if self.lists.hidden[index].required {
                let column = self.lists.hidden.remove(index);
                self.lists.scrollable.push(column);
            } else {
                index += 1;
            }
        }
        if let Some(index) = self.lists.scrollable.iter().position(|c| c.id == CAMPAIGN_COLUMN) {
            let column = self.lists.scrollable.remove(index);
            self.lists.frozen.push(column);
        }

        let ColumnLists {
            frozen,
            scrollable,
            hidden,
        } = self.lists;

        let sections = [
            (frozen, Section::Frozen),
            (scrollable, Section::Scrollable),
            (hidden, Section::Hidden),
        ];
        sections
            .into_iter()
            .flat_map(|(columns, section)| columns.into_iter().map(move |c| (c, section)))
            .enumerate()
            .map(|(order, (mut column, section))| {
                column.order = order;
                column.visible = section != Section::Hidden;
                column.frozen = section == Section::Frozen;
                column
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::layout::ColumnLayout;
    use bo_core::model::default_columns;

    fn lists(frozen: &[&str], scrollable: &[&str], hidden: &[&str]) -> ColumnLists {
        let make = |ids: &[&str]| -> Vec<ColumnDefinition> {
            ids.iter().map(|id| ColumnDefinition::new(*id, *id, "test")).collect()
        };
        ColumnLists {
            frozen: make(frozen),
            scrollable: make(scrollable),
            hidden: make(hidden),
        }
    }

    fn ids(columns: &[ColumnDefinition]) -> Vec<&str> {
        columns.iter().map(|c| c.id.as_str()).collect()
    }

    fn pointer(section: Section, hovered_index: Option<usize>, upper_half: bool) -> PointerTarget {
        PointerTarget {
            section,
            hovered_index,
            upper_half,
        }
    }

    #[test]
    fn test_moving_down_within_a_list_accounts_for_removal() {
        let lists = lists(&[], &["a", "b", "c", "d"], &[]);
        let source = DragSource {
            section: Section::Scrollable,
            index: 0,
        };

        // Lower half of "c": lands after "c", which is index 2 once "a" is gone
        let target = pointer(Section::Scrollable, Some(2), false);
        let plan = compute_insertion_plan(source, &target, &lists).unwrap();
        assert_eq!(plan.index, 2);

        let mut customizer = ColumnCustomizer { lists };
        customizer.apply(&plan).unwrap();
        assert_eq!(ids(&customizer.lists().scrollable), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_moving_up_within_a_list() {
        let lists = lists(&[], &["a", "b", "c", "d"], &[]);
        let source = DragSource {
            section: Section::Scrollable,
            index: 3,
        };
        let target = pointer(Section::Scrollable, Some(1), true);
        let plan = compute_insertion_plan(source, &target, &lists).unwrap();
        assert_eq!(plan.index, 1);
    }

    #[test]
    fn test_dropping_in_place_is_a_no_op() {
        let lists = lists(&[], &["a", "b", "c"], &[]);
        let source = DragSource {
            section: Section::Scrollable,
            index: 1,
        };
        let upper_half_of_self = pointer(Section::Scrollable, Some(1), true);
        assert!(compute_insertion_plan(source, &upper_half_of_self, &lists).is_none());
        let lower_half_of_previous = pointer(Section::Scrollable, Some(0), false);
        assert!(compute_insertion_plan(source, &lower_half_of_previous, &lists).is_none());
    }

    #[test]
    fn test_empty_section_accepts_drop_at_zero() {
        let lists = lists(&[], &["a", "b"], &[]);
        let source = DragSource {
            section: Section::Scrollable,
            index: 1,
        };
        let target = pointer(Section::Frozen, None, false);
        let plan = compute_insertion_plan(source, &target, &lists).unwrap();
        assert_eq!(plan.to, Section::Frozen);
        assert_eq!(plan.index, 0);
    }

    #[test]
    fn test_required_column_cannot_be_dropped_on_hidden() {
        let mut lists = lists(&["campaign"], &[], &["units"]);
        lists.frozen[0] = lists.frozen[0].clone().required();
        let source = DragSource {
            section: Section::Frozen,
            index: 0,
        };
        let target = pointer(Section::Hidden, None, false);
        assert!(compute_insertion_plan(source, &target, &lists).is_none());
    }

    #[test]
    fn test_stale_plan_is_rejected() {
        let mut customizer = ColumnCustomizer::new(&default_columns());
        let source = DragSource {
            section: Section::Scrollable,
            index: 0,
        };
        let plan = customizer
            .plan(source, &pointer(Section::Scrollable, None, false))
            .unwrap();
        customizer.remove_column(&plan.column_id).unwrap();
        assert!(matches!(customizer.apply(&plan), Err(ViewError::StalePlan(_))));
    }

    #[test]
    fn test_add_and_remove_columns() {
        let mut customizer = ColumnCustomizer::new(&default_columns());
        assert_eq!(ids(&customizer.lists().hidden), vec!["units", "rpc"]);

        customizer.add_column("units").unwrap();
        assert_eq!(customizer.lists().scrollable.last().unwrap().id, "units");

        customizer.remove_column("spend").unwrap();
        assert_eq!(customizer.lists().hidden.last().unwrap().id, "spend");

        assert!(matches!(
            customizer.remove_column("checkbox"),
            Err(ViewError::RequiredColumn(_))
        ));
        assert!(matches!(
            customizer.add_column("missing"),
            Err(ViewError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_save_recomputes_order_and_forces_campaign_frozen() {
        let mut customizer = ColumnCustomizer::new(&default_columns());
        let (section, index) = customizer.lists().position("campaign").unwrap();
        let plan = customizer
            .plan(
                DragSource { section, index },
                &pointer(Section::Scrollable, Some(0), true),
            )
            .unwrap();
        customizer.apply(&plan).unwrap();
        assert_eq!(customizer.lists().scrollable[0].id, "campaign");

        let saved = customizer.save();
        for (position, column) in saved.iter().enumerate() {
            assert_eq!(column.order, position);
        }
        let campaign = saved.iter().find(|c| c.id == "campaign").unwrap();
        assert!(campaign.frozen);
        assert!(campaign.visible);

        let layout = ColumnLayout::new(saved);
        let frozen: Vec<&str> = layout.frozen_columns().map(|c| c.id.as_str()).collect();
        assert_eq!(frozen, vec!["checkbox", "campaign"]);
        assert!(layout.column("units").map_or(false, |c| !c.visible));
    }

    #[test]
    fn test_moving_to_frozen_section_pins_column() {
        let mut customizer = ColumnCustomizer::new(&default_columns());
        let (section, index) = customizer.lists().position("acos").unwrap();
        let plan = customizer
            .plan(DragSource { section, index }, &pointer(Section::Frozen, None, false))
            .unwrap();
        customizer.apply(&plan).unwrap();

        let layout = ColumnLayout::new(customizer.save());
        let frozen: Vec<&str> = layout.frozen_columns().map(|c| c.id.as_str()).collect();
        assert_eq!(frozen, vec!["checkbox", "campaign", "acos"]);
    }
}
