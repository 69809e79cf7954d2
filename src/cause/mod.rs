pub mod wrap;

use std::collections::HashSet;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::taxonomy::Category;
use crate::types::CauseKind;

type RawFailure = Arc<dyn std::error::Error + Send + Sync>;

/// A concrete failure tagged with the categories it belongs to.
///
/// `kind` and `message` are fixed at construction. Wrapping only ever adds
/// categories, and attaches `data` when none is present yet.
#[derive(Debug, Clone)]
pub struct Cause {
    kind: CauseKind,
    message: String,
    origin: Option<&'static Location<'static>>,
    data: Option<serde_json::Value>,
    /// Tagging order, each category once.
    categories: Vec<Category>,
    members: HashSet<Category>,
    source: Option<RawFailure>,
}

impl Cause {
    /// An untagged cause, as produced by code that knows nothing of the taxonomy.
    #[track_caller]
    pub fn new(kind: CauseKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            origin: Some(Location::caller()),
            data: None,
            categories: Vec::new(),
            members: HashSet::new(),
            source: None,
        }
    }

    /// Lifts a boxed error into a cause. A boxed [`Cause`] is returned as is.
    #[track_caller]
    pub fn from_boxed(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match err.downcast::<Cause>() {
            Ok(cause) => *cause,
            Err(raw) => {
                let mut cause = Self::new(CauseKind::of_error(&*raw), raw.to_string());
                cause.source = Some(Arc::from(raw));
                cause
            }
        }
    }

    pub fn kind(&self) -> CauseKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the cause was first built or lifted.
    pub fn origin(&self) -> Option<&'static Location<'static>> {
        self.origin
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Applied categories in tagging order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Applied categories, most recently tagged and most specific first.
    pub fn categories_outermost_first(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().rev()
    }

    /// The lifted raw failure, when this cause did not start as a cause.
    pub fn raw(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Whether this cause is classified under `category`, directly or through
    /// the ancestry of any applied category.
    ///
    /// Tagging always inserts the full ancestor closure, so this is a set lookup.
    pub fn belongs_to(&self, category: &Category) -> bool {
        self.members.contains(category)
    }

    /// `"{message} ({categories outermost first})"`.
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Diagnostic rendering with kind and payload.
    pub fn inspect(&self) -> String {
        let mut out = format!("{:?}: {}", self.kind, self.format());
        if let Some(data) = &self.data {
            out.push_str(&format!(" data={data}"));
        }
        out
    }

    fn category_names(&self) -> String {
        self.categories_outermost_first()
            .map(Category::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Adds `category` and its missing ancestors, generic first, so that the
    /// reversed order reads from the tagged category outward.
    pub(crate) fn tag(&mut self, category: &Category) {
        let before = self.categories.len();
        for member in category.lineage_generic_first() {
            if self.members.insert(member.clone()) {
                self.categories.push(member);
            }
        }
        tracing::trace!(
            category = category.name(),
            kind = %self.kind,
            added = self.categories.len() - before,
            "tagged cause"
        );
    }

    pub(crate) fn attach_data(&mut self, data: Option<serde_json::Value>) {
        if self.data.is_none() {
            self.data = data;
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.category_names())
    }
}

impl std::error::Error for Cause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|raw| raw as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn chain() -> (Category, Category, Category) {
        let error = Category::new("Error".into(), vec![]);
        let foo = Category::new("FooError".into(), vec![error.clone()]);
        let faz = Category::new("FazError".into(), vec![foo.clone()]);
        (error, foo, faz)
    }

    #[test]
    fn tagging_inserts_ancestors_generic_first() {
        let (error, foo, faz) = chain();
        let mut cause = Cause::new(CauseKind::Io, "disk full");
        cause.tag(&faz);
        assert_eq!(cause.categories(), [error.clone(), foo.clone(), faz.clone()]);
        assert_eq!(cause.format(), "disk full (FazError, FooError, Error)");

        cause.tag(&foo);
        assert_eq!(cause.categories().len(), 3);
    }

    #[test]
    fn later_tagging_reads_first() {
        let (error, foo, _) = chain();
        let other = Category::new("Audit".into(), vec![error.clone()]);
        let mut cause = Cause::new(CauseKind::Runtime, "boom");
        cause.tag(&foo);
        cause.tag(&other);
        assert_eq!(cause.to_string(), "boom (Audit, FooError, Error)");
    }

    #[test]
    fn belongs_to_covers_ancestors_but_not_descendants() {
        let (error, foo, faz) = chain();
        let mut cause = Cause::new(CauseKind::Io, "x");
        cause.tag(&foo);

        assert!(cause.belongs_to(&foo));
        assert!(cause.belongs_to(&error));
        assert!(!cause.belongs_to(&faz));

        let unrelated = Category::new("Unrelated".into(), vec![]);
        assert!(!cause.belongs_to(&unrelated));
    }

    #[test]
    fn diamond_tagging_lists_shared_root_last() {
        let error = Category::new("Error".into(), vec![]);
        let storage = Category::new("StorageError".into(), vec![error.clone()]);
        let network = Category::new("NetworkError".into(), vec![error.clone()]);
        let replication = Category::new(
            "ReplicationError".into(),
            vec![storage.clone(), network.clone()],
        );

        let mut cause = Cause::new(CauseKind::Timeout, "lagging");
        cause.tag(&replication);
        assert_eq!(
            cause.format(),
            "lagging (ReplicationError, StorageError, NetworkError, Error)"
        );
        assert_eq!(cause.categories().first(), Some(&error));
    }

    #[test]
    fn data_is_attached_once() {
        let mut cause = Cause::new(CauseKind::Generic, "x");
        cause.attach_data(None);
        assert!(cause.data().is_none());
        cause.attach_data(Some(serde_json::json!({"some": "data"})));
        cause.attach_data(Some(serde_json::json!("other")));
        cause.attach_data(None);
        assert_eq!(cause.data(), Some(&serde_json::json!({"some": "data"})));
    }

    #[test]
    fn inspect_includes_kind_and_data() {
        let (error, _, _) = chain();
        let mut cause = Cause::new(CauseKind::Generic, "message");
        cause.tag(&error);
        assert_eq!(cause.inspect(), "Generic: message (Error)");

        cause.attach_data(Some(serde_json::json!({"some": "data"})));
        assert_eq!(cause.inspect(), r#"Generic: message (Error) data={"some":"data"}"#);
    }

    #[test]
    fn lifting_keeps_raw_error_as_source() {
        let raw: Box<dyn std::error::Error + Send + Sync> =
            Box::new(std::io::Error::other("pipe closed"));
        let cause = Cause::from_boxed(raw);
        assert_eq!(cause.kind(), CauseKind::Io);
        assert_eq!(cause.message(), "pipe closed");
        assert!(cause.categories().is_empty());
        assert!(cause.origin().is_some());

        let source = std::error::Error::source(&cause).unwrap();
        assert!(source.is::<std::io::Error>());
        assert!(cause.raw().unwrap().is::<std::io::Error>());
    }

    #[test]
    fn boxed_cause_is_not_lifted_again() {
        let (error, _, _) = chain();
        let mut cause = Cause::new(CauseKind::Argument, "bad");
        cause.tag(&error);
        let cause = Cause::from_boxed(Box::new(cause));
        assert_eq!(cause.kind(), CauseKind::Argument);
        assert_eq!(cause.categories(), [error]);
        assert!(cause.raw().is_none());
    }
}
