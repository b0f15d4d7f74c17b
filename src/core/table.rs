//! Tabular view engine — filter, sort and paginate an in-memory collection.
//!
//! Every list in the dashboard is derived through [`compute_view`].  The
//! engine is a pure function of `(rows, columns, state)`: it keeps nothing
//! between calls and knows nothing about the terminal.  Rows are anything
//! that can hand out a [`Value`] for a field name (see [`Row`]).

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDateTime;

/// Display format for [`Value::Time`].
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rows-per-page choices offered by the pagination footer.
pub const PAGE_SIZE_OPTIONS: &[usize] = &[10, 25, 50];

// ───────────────────────────────────────── values ────────────

/// A single cell value as seen by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Time(NaiveDateTime),
}

impl Value {
    /// Ordering between values of different kinds: numbers, then booleans,
    /// then times, then text.
    fn kind_rank(&self) -> u8 {
        match self {
            Value::Int(_) | Value::Float(_) => 0,
            Value::Bool(_) => 1,
            Value::Time(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{}", v.format(TIME_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Time(v)
    }
}

/// Natural ordering: numbers numerically (ints and floats mix), text
/// lexicographically, booleans `false < true`, times chronologically.
pub fn natural_cmp(a: &Value, b: &Value) -> Ordering {
    use Value::*;
    match (a, b) {
        (Int(x), Int(y)) => x.cmp(y),
        (Int(x), Float(y)) => (*x as f64).total_cmp(y),
        (Float(x), Int(y)) => x.total_cmp(&(*y as f64)),
        (Float(x), Float(y)) => x.total_cmp(y),
        (Text(x), Text(y)) => x.cmp(y),
        (Bool(x), Bool(y)) => x.cmp(y),
        (Time(x), Time(y)) => x.cmp(y),
        _ => a.kind_rank().cmp(&b.kind_rank()),
    }
}

// ───────────────────────────────────────── rows & columns ────

/// A record whose fields are addressable by name.
///
/// Returning `None` means "absent": the field never matches a search and
/// sorts after every present value.
pub trait Row {
    fn field(&self, name: &str) -> Option<Value>;
}

impl Row for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Row for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Horizontal alignment hint for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// Describes one column: which field it shows and how.
pub struct Column<R> {
    pub field: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    /// Minimum width in terminal cells.
    pub width: u16,
    pub align: Align,
    /// Shown instead of the value when the field is absent.
    pub placeholder: &'static str,
    /// Replaces the natural ordering when sorting by this column.
    pub compare: Option<fn(&R, &R) -> Ordering>,
    /// Replaces `Value`'s `Display` when rendering a cell.
    pub format: Option<fn(&Value, &R) -> String>,
}

impl<R> Column<R> {
    pub fn new(field: &'static str, label: &'static str) -> Self {
        Self {
            field,
            label,
            sortable: true,
            width: 8,
            align: Align::Left,
            placeholder: "-",
            compare: None,
            format: None,
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = text;
        self
    }

    pub fn compare_with(mut self, cmp: fn(&R, &R) -> Ordering) -> Self {
        self.compare = Some(cmp);
        self
    }

    pub fn format_with(mut self, fmt: fn(&Value, &R) -> String) -> Self {
        self.format = Some(fmt);
        self
    }
}

impl<R: Row> Column<R> {
    /// Text for this column's cell in `row`.
    pub fn display(&self, row: &R) -> String {
        match row.field(self.field) {
            Some(value) => match self.format {
                Some(fmt) => fmt(&value, row),
                None => value.to_string(),
            },
            None => self.placeholder.to_string(),
        }
    }
}

// ───────────────────────────────────────── view state ────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

}

/// User-controlled parameters deciding which rows are visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub sort: Option<SortKey>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
            page: 0,
            page_size: PAGE_SIZE_OPTIONS[0],
        }
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Header click semantics: the active ascending column flips to
    /// descending, anything else sorts ascending.
    pub fn request_sort(&mut self, field: &str) {
        let direction = match &self.sort {
            Some(key) if key.field == field => key.direction.toggled(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortKey {
            field: field.to_string(),
            direction,
        });
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.page = 0;
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.page = 0;
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.page = 0;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 0;
    }

    /// Number of pages needed for `total` rows (never less than one).
    pub fn page_count(&self, total: usize) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        total.div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page + 1 < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Pull the page index back in range after rows disappeared.
    pub fn clamp_page(&mut self, total: usize) {
        self.page = self.page.min(self.page_count(total) - 1);
    }
}

// ───────────────────────────────────────── stages ────────────

/// Keep rows where any column's value contains `query`, ignoring case.
/// An empty query keeps everything in order.
pub fn filter<'a, R: Row + 'a>(
    rows: impl IntoIterator<Item = &'a R>,
    columns: &[Column<R>],
    query: &str,
) -> Vec<&'a R> {
    if query.is_empty() {
        return rows.into_iter().collect();
    }
    let needle = query.to_lowercase();
    rows.into_iter()
        .filter(|row| {
            columns.iter().any(|column| {
                row.field(column.field)
                    .is_some_and(|v| v.to_string().to_lowercase().contains(&needle))
            })
        })
        .collect()
}

/// Stable sort by `key`.  `None` leaves the input order untouched.
///
/// Absent values sort after present ones in both directions.
pub fn sort<'a, R: Row>(
    mut rows: Vec<&'a R>,
    columns: &[Column<R>],
    key: Option<&SortKey>,
) -> Vec<&'a R> {
    let Some(key) = key else {
        return rows;
    };

    let custom = columns
        .iter()
        .find(|c| c.field == key.field)
        .and_then(|c| c.compare);
    if let Some(cmp) = custom {
        rows.sort_by(|a, b| key.direction.apply(cmp(a, b)));
        return rows;
    }

    let mut keyed: Vec<(Option<Value>, &'a R)> =
        rows.into_iter().map(|r| (r.field(&key.field), r)).collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => key.direction.apply(natural_cmp(a, b)),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    });
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// The `page`-th slice of `page_size` rows, clipped to the input.
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    let Some(start) = page.checked_mul(page_size) else {
        return &[];
    };
    if page_size == 0 || start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

// ───────────────────────────────────────── composition ───────

/// Rows visible on the current page plus the counts pagination needs.
#[derive(Debug)]
pub struct View<'a, R> {
    pub rows: Vec<&'a R>,
    /// Number of rows that survived the filter (all pages).
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

impl<R> View<'_, R> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `"11–20 of 42"` style footer text.
    pub fn range_label(&self, page_size: usize) -> String {
        if self.rows.is_empty() {
            return format!("0 of {}", self.total);
        }
        let first = self.page * page_size + 1;
        let last = first + self.rows.len() - 1;
        format!("{first}–{last} of {}", self.total)
    }
}

/// filter → sort → paginate.
pub fn compute_view<'a, R: Row + 'a>(
    rows: impl IntoIterator<Item = &'a R>,
    columns: &[Column<R>],
    state: &ViewState,
) -> View<'a, R> {
    let filtered = filter(rows, columns, &state.search);
    let total = filtered.len();
    let sorted = sort(filtered, columns, state.sort.as_ref());
    let rows = paginate(&sorted, state.page, state.page_size).to_vec();
    View {
        rows,
        total,
        page: state.page,
        page_count: state.page_count(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Rec = BTreeMap<String, Value>;

    fn descending_by(field: &str) -> SortKey {
        SortKey {
            field: field.to_string(),
            direction: SortDirection::Descending,
        }
    }

    fn rec(name: &str, size: i64) -> Rec {
        let mut m = BTreeMap::new();
        m.insert("name".to_string(), Value::from(name));
        m.insert("size".to_string(), Value::from(size));
        m
    }

    fn cols() -> Vec<Column<Rec>> {
        vec![Column::new("name", "Name"), Column::new("size", "Size")]
    }

    fn names(rows: &[&Rec]) -> Vec<String> {
        rows.iter()
            .map(|r| r.field("name").map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn empty_query_keeps_every_row_in_order() {
        let rows = vec![rec("b", 2), rec("a", 1), rec("c", 3)];
        let out = filter(&rows, &cols(), "");
        assert_eq!(names(&out), ["b", "a", "c"]);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let mut hosts = BTreeMap::new();
        hosts.insert("path".to_string(), Value::from("/etc/hosts"));
        let mut other = BTreeMap::new();
        other.insert("path".to_string(), Value::from("/var/log"));
        let rows = vec![hosts, other];
        let columns = vec![Column::<Rec>::new("path", "Path")];

        let out = filter(&rows, &columns, "ETC");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].field("path"), Some(Value::from("/etc/hosts")));
    }

    #[test]
    fn filter_matches_numbers_by_their_text() {
        let rows = vec![rec("a", 1024), rec("b", 7)];
        let out = filter(&rows, &cols(), "102");
        assert_eq!(names(&out), ["a"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let rows = vec![rec("alpha", 1), rec("beta", 2), rec("gamma", 3), rec("delta", 4)];
        let columns = cols();
        let once = filter(&rows, &columns, "ta");
        let twice = filter(once.iter().copied(), &columns, "ta");
        assert_eq!(names(&once), names(&twice));
        assert_eq!(names(&once), ["beta", "delta"]);
    }

    #[test]
    fn unknown_field_never_matches() {
        let rows = vec![rec("a", 1)];
        let columns = vec![Column::<Rec>::new("missing", "Missing")];
        assert!(filter(&rows, &columns, "a").is_empty());
    }

    #[test]
    fn sort_by_name_ascending() {
        let rows = vec![rec("b", 2), rec("a", 1)];
        let key = SortKey::ascending("name");
        let out = sort(rows.iter().collect(), &cols(), Some(&key));
        assert_eq!(names(&out), ["a", "b"]);
        assert_eq!(out[0].field("size"), Some(Value::Int(1)));
    }

    #[test]
    fn numbers_sort_numerically() {
        let rows = vec![rec("x", 10), rec("y", 9), rec("z", 100)];
        let key = SortKey::ascending("size");
        let out = sort(rows.iter().collect(), &cols(), Some(&key));
        assert_eq!(names(&out), ["y", "x", "z"]);
    }

    #[test]
    fn descending_is_reverse_of_ascending_for_distinct_values() {
        let rows = vec![rec("d", 4), rec("b", 2), rec("e", 5), rec("a", 1), rec("c", 3)];
        let columns = cols();
        let asc = sort(rows.iter().collect(), &columns, Some(&SortKey::ascending("size")));
        let mut desc = sort(rows.iter().collect(), &columns, Some(&descending_by("size")));
        desc.reverse();
        assert_eq!(names(&asc), names(&desc));
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let rows = vec![rec("first", 1), rec("second", 1), rec("third", 0)];
        let columns = cols();
        let asc = sort(rows.iter().collect(), &columns, Some(&SortKey::ascending("size")));
        assert_eq!(names(&asc), ["third", "first", "second"]);
        let desc = sort(rows.iter().collect(), &columns, Some(&descending_by("size")));
        assert_eq!(names(&desc), ["first", "second", "third"]);
    }

    #[test]
    fn no_sort_key_keeps_order() {
        let rows = vec![rec("b", 2), rec("a", 1)];
        let out = sort(rows.iter().collect(), &cols(), None);
        assert_eq!(names(&out), ["b", "a"]);
    }

    #[test]
    fn unknown_sort_field_keeps_order() {
        let rows = vec![rec("b", 2), rec("c", 3), rec("a", 1)];
        let key = SortKey::ascending("nope");
        let out = sort(rows.iter().collect(), &cols(), Some(&key));
        assert_eq!(names(&out), ["b", "c", "a"]);
    }

    #[test]
    fn absent_values_sort_last() {
        let mut bare = BTreeMap::new();
        bare.insert("name".to_string(), Value::from("bare"));
        let rows = vec![bare, rec("b", 2), rec("a", 1)];
        let columns = cols();
        let asc = sort(rows.iter().collect(), &columns, Some(&SortKey::ascending("size")));
        assert_eq!(names(&asc), ["a", "b", "bare"]);
        let desc = sort(rows.iter().collect(), &columns, Some(&descending_by("size")));
        assert_eq!(names(&desc), ["b", "a", "bare"]);
    }

    #[test]
    fn custom_comparator_wins() {
        fn by_name_len(a: &Rec, b: &Rec) -> Ordering {
            let len = |r: &Rec| r.field("name").map(|v| v.to_string().len()).unwrap_or(0);
            len(a).cmp(&len(b))
        }
        let rows = vec![rec("ccc", 0), rec("a", 0), rec("bb", 0)];
        let columns = vec![Column::new("name", "Name").compare_with(by_name_len)];
        let out = sort(rows.iter().collect(), &columns, Some(&SortKey::ascending("name")));
        assert_eq!(names(&out), ["a", "bb", "ccc"]);
    }

    #[test]
    fn paginate_clips_and_handles_out_of_range() {
        let rows = [1, 2, 3, 4, 5];
        assert_eq!(paginate(&rows, 0, 2), &[1, 2]);
        assert_eq!(paginate(&rows, 2, 2), &[5]);
        assert!(paginate(&rows, 3, 2).is_empty());
        assert!(paginate(&rows, 0, 0).is_empty());
        assert!(paginate(&rows, usize::MAX, 2).is_empty());
    }

    #[test]
    fn pages_concatenate_back_to_input() {
        let rows: Vec<u32> = (0..23).collect();
        for size in 1..=24 {
            let pages = rows.len().div_ceil(size);
            let joined: Vec<u32> = (0..pages)
                .flat_map(|p| paginate(&rows, p, size).iter().copied())
                .collect();
            assert_eq!(joined, rows, "page size {size}");
        }
    }

    #[test]
    fn compute_view_filters_then_sorts_then_pages() {
        let rows = vec![
            rec("web-3", 3),
            rec("db-1", 10),
            rec("web-1", 1),
            rec("web-2", 2),
        ];
        let mut state = ViewState::with_page_size(2);
        state.set_search("WEB");
        state.request_sort("size");

        let view = compute_view(&rows, &cols(), &state);
        assert_eq!(view.total, 3);
        assert_eq!(view.page_count, 2);
        assert_eq!(names(&view.rows), ["web-1", "web-2"]);

        state.next_page(view.total);
        let view = compute_view(&rows, &cols(), &state);
        assert_eq!(names(&view.rows), ["web-3"]);
        assert_eq!(view.range_label(state.page_size), "3–3 of 3");
    }

    #[test]
    fn request_sort_toggles_only_the_active_column() {
        let mut state = ViewState::default();
        state.request_sort("name");
        assert_eq!(state.sort, Some(SortKey::ascending("name")));
        state.request_sort("name");
        assert_eq!(state.sort, Some(descending_by("name")));
        state.request_sort("name");
        assert_eq!(state.sort, Some(SortKey::ascending("name")));
        state.request_sort("size");
        assert_eq!(state.sort, Some(SortKey::ascending("size")));
    }

    #[test]
    fn page_changes_are_clamped() {
        let mut state = ViewState::with_page_size(2);
        state.next_page(5);
        state.next_page(5);
        state.next_page(5);
        assert_eq!(state.page, 2);
        state.clamp_page(1);
        assert_eq!(state.page, 0);
        state.prev_page();
        assert_eq!(state.page, 0);

        state.page = 4;
        state.set_page_size(25);
        assert_eq!(state.page, 0);
        state.page = 3;
        state.push_search('x');
        assert_eq!(state.page, 0);
    }

    #[test]
    fn column_display_uses_formatter_and_placeholder() {
        let columns: Vec<Column<Rec>> = vec![
            Column::<Rec>::new("size", "Size").format_with(|v, _| format!("{v} B")),
            Column::<Rec>::new("owner", "Owner").placeholder("n/a"),
        ];
        let row = rec("a", 12);
        assert_eq!(columns[0].display(&row), "12 B");
        assert_eq!(columns[1].display(&row), "n/a");
    }

    #[test]
    fn mixed_numeric_kinds_compare_by_value() {
        assert_eq!(natural_cmp(&Value::Int(2), &Value::Float(1.5)), Ordering::Greater);
        assert_eq!(natural_cmp(&Value::Float(0.5), &Value::Int(1)), Ordering::Less);
        assert_eq!(natural_cmp(&Value::Int(5), &Value::from("a")), Ordering::Less);
    }
}
