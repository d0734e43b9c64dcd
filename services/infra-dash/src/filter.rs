// services/infra-dash/src/filter.rs
//
// Composable list filters used by every screen.
//
// Filters are rebuilt from the current inputs on every draw; they borrow the
// source collection and never reorder it.

/// Records that free-text search can look into.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Categorical filter with an "all" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: Copy + PartialEq> Choice<T> {
    pub fn admits(&self, value: T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(v) => *v == value,
        }
    }

    /// All -> options[0] -> ... -> options[n-1] -> All
    pub fn cycle(&self, options: &[T]) -> Choice<T> {
        match self {
            Choice::All => options.first().copied().map_or(Choice::All, Choice::Only),
            Choice::Only(current) => {
                match options.iter().position(|o| o == current) {
                    Some(idx) if idx + 1 < options.len() => Choice::Only(options[idx + 1]),
                    _ => Choice::All,
                }
            }
        }
    }

    pub fn label_with(&self, label: impl Fn(&T) -> String) -> String {
        match self {
            Choice::All => "all".to_string(),
            Choice::Only(v) => label(v),
        }
    }
}

pub fn matches_text(query: &str, fields: &[&str]) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

/// AND-combination of predicates.
pub struct Filter<'a, T> {
    predicates: Vec<Predicate<'a, T>>,
}

impl<'a, T: 'a> Filter<'a, T> {
    pub fn new() -> Self {
        Self { predicates: Vec::new() }
    }

    pub fn search(mut self, query: &'a str) -> Self
    where
        T: Searchable,
    {
        if !query.trim().is_empty() {
            self.predicates
                .push(Box::new(move |item: &T| matches_text(query, &item.search_fields())));
        }
        self
    }

    pub fn choice<V>(mut self, choice: Choice<V>, key: impl Fn(&T) -> V + 'a) -> Self
    where
        V: Copy + PartialEq + 'a,
    {
        if let Choice::Only(_) = choice {
            self.predicates.push(Box::new(move |item: &T| choice.admits(key(item))));
        }
        self
    }

    pub fn when(mut self, predicate: impl Fn(&T) -> bool + 'a) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|p| p(item))
    }

    pub fn apply<'s>(&self, items: &'s [T]) -> Vec<&'s T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

impl<'a, T: 'a> Default for Filter<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Colour {
        Red,
        Blue,
    }

    #[derive(Debug)]
    struct Row {
        name: &'static str,
        city: &'static str,
        colour: Colour,
    }

    impl Searchable for Row {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name, self.city]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "OLT-JAKARTA-01", city: "Jakarta", colour: Colour::Red },
            Row { name: "ODF-BANDUNG-02", city: "Bandung", colour: Colour::Blue },
            Row { name: "ODC-YOGYA-01", city: "Yogyakarta", colour: Colour::Red },
        ]
    }

    #[test]
    fn test_all_sentinel_keeps_order_and_count() {
        let rows = rows();
        let filtered = Filter::new().choice(Choice::<Colour>::All, |r: &Row| r.colour).apply(&rows);
        let names: Vec<_> = filtered.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["OLT-JAKARTA-01", "ODF-BANDUNG-02", "ODC-YOGYA-01"]);
    }

    #[test]
    fn test_search_is_case_insensitive_contains() {
        let rows = rows();
        let filtered = Filter::new().search("jakarta").apply(&rows);
        assert_eq!(filtered.len(), 1);
        let filtered = Filter::new().search("YOGYA").apply(&rows);
        assert_eq!(filtered[0].city, "Yogyakarta");
    }

    #[test]
    fn test_search_without_match_is_empty() {
        let rows = rows();
        assert!(Filter::new().search("surabaya").apply(&rows).is_empty());
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let rows = rows();
        let filtered = Filter::new()
            .search("-01")
            .choice(Choice::Only(Colour::Red), |r: &Row| r.colour)
            .when(|r: &Row| r.city.starts_with('Y'))
            .apply(&rows);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "ODC-YOGYA-01");
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let rows = rows();
        assert_eq!(Filter::new().search("   ").apply(&rows).len(), 3);
    }

    #[test]
    fn test_choice_cycles_through_options_and_back() {
        let options = [Colour::Red, Colour::Blue];
        let mut choice = Choice::All;
        choice = choice.cycle(&options);
        assert_eq!(choice, Choice::Only(Colour::Red));
        choice = choice.cycle(&options);
        assert_eq!(choice, Choice::Only(Colour::Blue));
        choice = choice.cycle(&options);
        assert_eq!(choice, Choice::All);
        assert_eq!(Choice::<Colour>::All.cycle(&[]), Choice::All);
    }
}
