//! Drift detection and late initialization over declarative field tables.
//!
//! Each managed kind describes its reconcilable fields once, as a list of
//! [`Field`]s mapping a spec field to the matching field of the ZPA payload.
//! [`is_up_to_date`] and [`late_initialize`] then walk that list, so adding a
//! field is a one-line change to the table.

use log::debug;
use std::collections::BTreeSet;

/// Comparison and late-init rules for one kind of spec value.
pub trait FieldValue: Clone + 'static {
    /// Whether the value counts as "let the server decide".
    fn is_unset(&self) -> bool;

    /// Whether a desired value agrees with an observed one.
    fn matches(desired: &Self, observed: &Self) -> bool;
}

impl FieldValue for Option<String> {
    fn is_unset(&self) -> bool {
        self.as_deref().map_or(true, str::is_empty)
    }

    fn matches(desired: &Self, observed: &Self) -> bool {
        normalized(desired) == normalized(observed)
    }
}

fn normalized(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

impl FieldValue for Option<bool> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }

    fn matches(desired: &Self, observed: &Self) -> bool {
        desired == observed
    }
}

impl FieldValue for Option<Vec<String>> {
    fn is_unset(&self) -> bool {
        self.as_ref().map_or(true, Vec::is_empty)
    }

    // order and duplicates are irrelevant
    fn matches(desired: &Self, observed: &Self) -> bool {
        content(desired) == content(observed)
    }
}

fn content(xs: &Option<Vec<String>>) -> BTreeSet<&str> {
    xs.iter().flatten().map(String::as_str).collect()
}

/// One reconcilable field of spec `P` and its counterpart in payload `O`.
pub struct Field<P, O> {
    name: &'static str,
    late_init: bool,
    up_to_date: Box<dyn Fn(&P, &O) -> bool + Send + Sync>,
    merge: Box<dyn Fn(&mut P, &O) + Send + Sync>,
}

impl<P: 'static, O: 'static> Field<P, O> {
    /// A field compared for drift. `get` and `get_mut` address the spec value,
    /// `observed` extracts the server value in the same representation.
    pub fn new<V: FieldValue>(
        name: &'static str,
        get: fn(&P) -> &V,
        get_mut: fn(&mut P) -> &mut V,
        observed: fn(&O) -> V,
    ) -> Self {
        Field {
            name,
            late_init: false,
            up_to_date: Box::new(move |p, o| V::matches(get(p), &observed(o))),
            merge: Box::new(move |p, o| {
                let server = observed(o);
                let slot = get_mut(p);
                if slot.is_unset() && !server.is_unset() {
                    *slot = server;
                }
            }),
        }
    }

    /// Marks the field as filled from the server while unset in the spec.
    pub fn late_initialized(mut self) -> Self {
        self.late_init = true;
        self
    }
}

/// Reports whether every field of `desired` matches `observed`.
/// Stops at the first mismatch.
pub fn is_up_to_date<P, O>(fields: &[Field<P, O>], desired: &P, observed: &O) -> bool {
    match fields.iter().find(|f| !(f.up_to_date)(desired, observed)) {
        Some(f) => {
            debug!("field {} drifted", f.name);
            false
        }
        None => true,
    }
}

/// Copies server values into late-initialized fields that are unset in `desired`.
/// Fields the user set are never touched.
pub fn late_initialize<P, O>(fields: &[Field<P, O>], desired: &mut P, observed: &O) {
    for f in fields.iter().filter(|f| f.late_init) {
        (f.merge)(desired, observed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Spec {
        label: Option<String>,
        on: Option<bool>,
        hosts: Option<Vec<String>>,
        note: Option<String>,
    }

    #[derive(Clone, Debug, Default)]
    struct Remote {
        label: Option<String>,
        on: bool,
        hosts: Option<Vec<String>>,
        note: Option<String>,
    }

    fn fields() -> Vec<Field<Spec, Remote>> {
        vec![
            Field::new(
                "label",
                |p: &Spec| &p.label,
                |p: &mut Spec| &mut p.label,
                |o: &Remote| o.label.clone(),
            )
            .late_initialized(),
            Field::new(
                "on",
                |p: &Spec| &p.on,
                |p: &mut Spec| &mut p.on,
                |o: &Remote| Some(o.on),
            )
            .late_initialized(),
            Field::new(
                "hosts",
                |p: &Spec| &p.hosts,
                |p: &mut Spec| &mut p.hosts,
                |o: &Remote| o.hosts.clone(),
            ),
            Field::new(
                "note",
                |p: &Spec| &p.note,
                |p: &mut Spec| &mut p.note,
                |o: &Remote| o.note.clone(),
            ),
        ]
    }

    fn strings(xs: &[&str]) -> Option<Vec<String>> {
        Some(xs.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn empty_string_and_none_are_equal() {
        assert!(FieldValue::matches(&Some(String::new()), &None::<String>));
        assert!(FieldValue::matches(&None::<String>, &Some(String::new())));
        assert!(!FieldValue::matches(&None::<String>, &Some("x".to_string())));
    }

    #[test]
    fn lists_compare_as_sets() {
        assert!(FieldValue::matches(&strings(&["a", "b"]), &strings(&["b", "a"])));
        assert!(!FieldValue::matches(&strings(&["a", "b"]), &strings(&["a", "c"])));
        assert!(FieldValue::matches(&Some(vec![]), &None::<Vec<String>>));
    }

    #[test]
    fn identical_is_up_to_date() {
        let spec = Spec {
            label: Some("x".into()),
            on: Some(true),
            hosts: strings(&["a.com", "b.com"]),
            note: None,
        };
        let remote = Remote {
            label: Some("x".into()),
            on: true,
            hosts: strings(&["b.com", "a.com"]),
            note: Some(String::new()),
        };
        assert!(is_up_to_date(&fields(), &spec, &remote));
    }

    #[test]
    fn any_difference_is_drift() {
        let spec = Spec {
            label: Some("x".into()),
            on: Some(true),
            ..Default::default()
        };
        let remote = Remote {
            label: Some("x".into()),
            on: true,
            ..Default::default()
        };
        let fields = fields();
        assert!(is_up_to_date(&fields, &spec, &remote));

        let mut changed = spec.clone();
        changed.on = Some(false);
        assert!(!is_up_to_date(&fields, &changed, &remote));

        let mut changed = spec.clone();
        changed.note = Some("hello".into());
        assert!(!is_up_to_date(&fields, &changed, &remote));

        let mut changed = spec;
        changed.hosts = strings(&["a.com"]);
        assert!(!is_up_to_date(&fields, &changed, &remote));
    }

    #[test]
    fn late_init_fills_only_unset_fields() {
        let mut spec = Spec {
            on: Some(false),
            ..Default::default()
        };
        let remote = Remote {
            label: Some("server".into()),
            on: true,
            hosts: strings(&["a.com"]),
            note: Some("n".into()),
        };
        late_initialize(&fields(), &mut spec, &remote);

        assert_eq!(spec.label.as_deref(), Some("server"));
        assert_eq!(spec.on, Some(false));
        // not marked for late init
        assert_eq!(spec.hosts, None);
        assert_eq!(spec.note, None);
    }

    #[test]
    fn late_init_skips_empty_server_values() {
        let mut spec = Spec::default();
        let remote = Remote {
            label: Some(String::new()),
            ..Default::default()
        };
        late_initialize(&fields(), &mut spec, &remote);
        assert_eq!(spec.label, None);
        assert_eq!(spec.on, Some(false));
    }

    #[test]
    fn late_init_is_idempotent() {
        let remote = Remote {
            label: Some("server".into()),
            on: true,
            ..Default::default()
        };
        let fields = fields();

        let mut once = Spec::default();
        late_initialize(&fields, &mut once, &remote);
        let mut twice = once.clone();
        late_initialize(&fields, &mut twice, &remote);

        assert_eq!(once, twice);
    }
}
