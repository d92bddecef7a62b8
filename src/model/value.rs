//! Candidate values.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Bound on value payloads.
///
/// Any clonable, comparable, thread-safe type qualifies; the blanket
/// implementation means callers never implement this by hand.
pub trait Payload: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static> Payload for T {}

/// Category of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    TimeSlot,
    Classroom,
    Teacher,
    Date,
    Location,
    DayOfWeek,
    TimePeriod,
    CourseOffering,
    Semester,
    RoomType,
    Equipment,
    /// Caller-defined category.
    Other(String),
}

impl ValueKind {
    /// Upper-case tag used to derive default identifiers.
    pub fn tag(&self) -> &str {
        match self {
            ValueKind::TimeSlot => "TIME_SLOT",
            ValueKind::Classroom => "CLASSROOM",
            ValueKind::Teacher => "TEACHER",
            ValueKind::Date => "DATE",
            ValueKind::Location => "LOCATION",
            ValueKind::DayOfWeek => "DAY_OF_WEEK",
            ValueKind::TimePeriod => "TIME_PERIOD",
            ValueKind::CourseOffering => "COURSE_OFFERING",
            ValueKind::Semester => "SEMESTER",
            ValueKind::RoomType => "ROOM_TYPE",
            ValueKind::Equipment => "EQUIPMENT",
            ValueKind::Other(tag) => tag,
        }
    }
}

#[derive(Debug)]
struct ValueData<P> {
    id: String,
    kind: ValueKind,
    payload: P,
    label: String,
    preference: f64,
}

/// A candidate assignment for a variable, e.g. "Teacher A".
///
/// `P` is the typed payload the embedding application attaches (a teacher
/// id, a room record, a time-slot struct). Values are immutable and cheap
/// to clone. Two values are equal when both their ids and payloads are
/// equal; hashing uses the id only.
///
/// # Examples
///
/// ```
/// use u_csp::model::{Value, ValueKind};
///
/// let room = Value::new(ValueKind::Classroom, 101u32, "Room 101").with_preference(2.5);
/// assert_eq!(room.id(), "CLASSROOM_101");
/// assert_eq!(*room.payload(), 101);
/// assert_eq!(room.preference(), 2.5);
/// ```
pub struct Value<P = ()>(Arc<ValueData<P>>);

impl<P: Payload> Value<P> {
    /// Creates a value with an explicit identifier.
    pub fn with_id(
        id: impl Into<String>,
        kind: ValueKind,
        payload: P,
        label: impl Into<String>,
        preference: f64,
    ) -> Self {
        Self(Arc::new(ValueData {
            id: id.into(),
            kind,
            payload,
            label: label.into(),
            preference,
        }))
    }

    /// Returns a copy of this value with a different preference score.
    pub fn with_preference(&self, preference: f64) -> Self {
        Self::with_id(
            self.0.id.clone(),
            self.0.kind.clone(),
            self.0.payload.clone(),
            self.0.label.clone(),
            preference,
        )
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn kind(&self) -> &ValueKind {
        &self.0.kind
    }

    pub fn payload(&self) -> &P {
        &self.0.payload
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    /// Preference score; higher is more desirable.
    pub fn preference(&self) -> f64 {
        self.0.preference
    }
}

impl<P: Payload + fmt::Display> Value<P> {
    /// Creates a value whose id is derived from its kind and payload.
    pub fn new(kind: ValueKind, payload: P, label: impl Into<String>) -> Self {
        let id = format!("{}_{}", kind.tag(), payload);
        Self::with_id(id, kind, payload, label, 0.0)
    }
}

impl Value<()> {
    /// Shorthand for payload-free values: id and label are `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_id(name.clone(), ValueKind::Other("VALUE".into()), (), name, 0.0)
    }
}

impl<P> Clone for Value<P> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<P: PartialEq> PartialEq for Value<P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.id == other.0.id && self.0.payload == other.0.payload)
    }
}

impl<P: Eq> Eq for Value<P> {}

impl<P> Hash for Value<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl<P: fmt::Debug> fmt::Debug for Value<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({}: {:?})", self.0.id, self.0.payload)
    }
}

impl<P: fmt::Debug> fmt::Display for Value<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}:{:?}]", self.0.label, self.0.kind.tag(), self.0.payload)
    }
}
