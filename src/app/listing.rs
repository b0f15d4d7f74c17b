//! A table page: rows, their columns, the view state and a cursor.

use crate::core::table::{compute_view, Column, Row, SortKey, View, ViewState};

pub struct Listing<R> {
    pub rows: Vec<R>,
    pub columns: Vec<Column<R>>,
    pub view: ViewState,
    /// Cursor index within the current page.
    pub selected: usize,
}

impl<R: Row> Listing<R> {
    pub fn new(rows: Vec<R>, columns: Vec<Column<R>>, page_size: usize) -> Self {
        Self {
            rows,
            columns,
            view: ViewState::with_page_size(page_size),
            selected: 0,
        }
    }

    pub fn visible(&self) -> View<'_, R> {
        compute_view(&self.rows, &self.columns, &self.view)
    }

    pub fn selected_row(&self) -> Option<&R> {
        self.visible().rows.get(self.selected).copied()
    }

    /// Replace the rows, keeping page and cursor in range.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.reclamp();
    }

    pub fn retain(&mut self, keep: impl FnMut(&R) -> bool) {
        self.rows.retain(keep);
        self.reclamp();
    }

    pub fn reclamp(&mut self) {
        let total = self.visible().total;
        self.view.clamp_page(total);
        let on_page = self.visible().rows.len();
        self.selected = self.selected.min(on_page.saturating_sub(1));
    }

    fn sortable_fields(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.sortable)
            .map(|c| c.field)
            .collect()
    }

    fn label_of(&self, field: &str) -> &'static str {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map_or("", |c| c.label)
    }
}

/// Cursor, paging, sorting and search over any [`Listing`], object-safe so
/// key handlers can work with whichever table the current page shows.
pub trait Browse {
    fn select_next(&mut self);
    fn select_prev(&mut self);
    fn next_page(&mut self);
    fn prev_page(&mut self);
    /// Move the sort to the next sortable column (after the last one, sorting
    /// is cleared).  Returns a description for the status line.
    fn cycle_sort(&mut self) -> String;
    /// Reverse the current sort, or start one on the first sortable column.
    fn flip_sort(&mut self) -> String;
    fn search(&self) -> &str;
    fn push_search(&mut self, c: char);
    fn pop_search(&mut self);
    fn clear_search(&mut self);
    fn set_page_size(&mut self, size: usize);
}

impl<R: Row> Browse for Listing<R> {
    fn select_next(&mut self) {
        let on_page = self.visible().rows.len();
        if on_page > 0 && self.selected < on_page - 1 {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn next_page(&mut self) {
        let total = self.visible().total;
        let before = self.view.page;
        self.view.next_page(total);
        if self.view.page != before {
            self.selected = 0;
        }
    }

    fn prev_page(&mut self) {
        let before = self.view.page;
        self.view.prev_page();
        if self.view.page != before {
            self.selected = 0;
        }
    }

    fn cycle_sort(&mut self) -> String {
        let fields = self.sortable_fields();
        let next = match &self.view.sort {
            None => fields.first().copied(),
            Some(key) => fields
                .iter()
                .position(|f| *f == key.field)
                .and_then(|i| fields.get(i + 1).copied()),
        };
        self.selected = 0;
        match next {
            Some(field) => {
                self.view.sort = Some(SortKey::ascending(field));
                format!("Sorted by {} ▲", self.label_of(field))
            }
            None => {
                self.view.clear_sort();
                "Unsorted".to_string()
            }
        }
    }

    fn flip_sort(&mut self) -> String {
        let field = match &self.view.sort {
            Some(key) => Some(key.field.clone()),
            None => self.sortable_fields().first().map(|f| f.to_string()),
        };
        let Some(field) = field else {
            return "Nothing to sort".to_string();
        };
        self.view.request_sort(&field);
        self.selected = 0;
        let arrow = self
            .view
            .sort
            .as_ref()
            .map_or("", |k| k.direction.arrow());
        format!("Sorted by {} {arrow}", self.label_of(&field))
    }

    fn search(&self) -> &str {
        &self.view.search
    }

    fn push_search(&mut self, c: char) {
        self.view.push_search(c);
        self.selected = 0;
    }

    fn pop_search(&mut self) {
        self.view.pop_search();
        self.selected = 0;
    }

    fn clear_search(&mut self) {
        self.view.set_search("");
        self.selected = 0;
    }

    fn set_page_size(&mut self, size: usize) {
        self.view.set_page_size(size);
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::SortDirection;
    use std::collections::BTreeMap;

    use crate::core::table::Value;

    type Rec = BTreeMap<String, Value>;

    fn listing(n: i64) -> Listing<Rec> {
        let rows = (0..n)
            .map(|i| {
                let mut m = Rec::new();
                m.insert("id".into(), Value::from(i));
                m.insert("name".into(), Value::from(format!("row{i:02}")));
                m
            })
            .collect();
        let columns = vec![
            Column::new("id", "ID"),
            Column::new("name", "Name"),
            Column::new("note", "Note").unsortable(),
        ];
        Listing::new(rows, columns, 10)
    }

    #[test]
    fn cursor_stays_on_page() {
        let mut l = listing(12);
        for _ in 0..20 {
            l.select_next();
        }
        assert_eq!(l.selected, 9);
        l.next_page();
        assert_eq!((l.view.page, l.selected), (1, 0));
        l.select_next();
        l.select_next();
        assert_eq!(l.selected, 1);
        l.next_page();
        assert_eq!((l.view.page, l.selected), (1, 1));
    }

    #[test]
    fn sort_cycles_through_sortable_columns_then_clears() {
        let mut l = listing(3);
        assert_eq!(l.cycle_sort(), "Sorted by ID ▲");
        assert_eq!(l.cycle_sort(), "Sorted by Name ▲");
        assert_eq!(l.cycle_sort(), "Unsorted");
        assert!(l.view.sort.is_none());
    }

    #[test]
    fn flip_reverses_current_sort() {
        let mut l = listing(3);
        l.flip_sort();
        assert_eq!(l.view.sort, Some(SortKey::ascending("id")));
        l.flip_sort();
        let key = l.view.sort.clone().unwrap();
        assert_eq!(key.direction, SortDirection::Descending);
        assert_eq!(l.selected_row().and_then(|r| r.field("id")), Some(Value::from(2i64)));
    }

    #[test]
    fn removing_rows_pulls_page_back() {
        let mut l = listing(11);
        l.next_page();
        assert_eq!(l.view.page, 1);
        l.retain(|r| r.field("id") != Some(Value::from(10i64)));
        assert_eq!(l.view.page, 0);
        assert!(l.selected_row().is_some());
    }

    #[test]
    fn search_resets_cursor() {
        let mut l = listing(12);
        l.select_next();
        l.push_search('1');
        assert_eq!(l.selected, 0);
        assert_eq!(l.search(), "1");
        assert_eq!(l.visible().total, 3);
        l.clear_search();
        assert_eq!(l.visible().total, 12);
    }
}
