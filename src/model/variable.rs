//! CSP variables.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Category of a variable.
///
/// The engine never branches on the kind; it exists so that constraints
/// and callers can tell a teacher slot from a room slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariableKind {
    /// Assigns a teacher to a course offering.
    TeacherAssignment,
    /// Assigns a classroom to a course offering.
    ClassroomAssignment,
    /// Assigns a time slot to a course offering.
    TimeSlotAssignment,
    /// Places a course offering in the timetable.
    CourseScheduling,
    /// Enrolls students in course offerings.
    StudentEnrollment,
    /// Allocates rooms for specific periods.
    RoomAllocation,
    /// A teacher's weekly schedule.
    TeacherSchedule,
    /// A classroom's weekly schedule.
    ClassroomSchedule,
    /// Caller-defined category.
    Other(String),
}

impl VariableKind {
    /// Upper-case tag used to derive default identifiers.
    pub fn tag(&self) -> &str {
        match self {
            VariableKind::TeacherAssignment => "TEACHER_ASSIGNMENT",
            VariableKind::ClassroomAssignment => "CLASSROOM_ASSIGNMENT",
            VariableKind::TimeSlotAssignment => "TIME_SLOT_ASSIGNMENT",
            VariableKind::CourseScheduling => "COURSE_SCHEDULING",
            VariableKind::StudentEnrollment => "STUDENT_ENROLLMENT",
            VariableKind::RoomAllocation => "ROOM_ALLOCATION",
            VariableKind::TeacherSchedule => "TEACHER_SCHEDULE",
            VariableKind::ClassroomSchedule => "CLASSROOM_SCHEDULE",
            VariableKind::Other(tag) => tag,
        }
    }
}

#[derive(Debug)]
struct VariableData {
    id: String,
    kind: VariableKind,
    entity_id: String,
    label: String,
}

/// Something that needs a value, e.g. "teacher for section 3".
///
/// Cloning is cheap (shared, immutable data). Equality and hashing use
/// the identifier only.
///
/// # Examples
///
/// ```
/// use u_csp::model::{Variable, VariableKind};
///
/// let v = Variable::new(VariableKind::TeacherAssignment, "CS101-1", "Teacher for CS101-1");
/// assert_eq!(v.id(), "TEACHER_ASSIGNMENT_CS101-1");
/// assert_eq!(v, Variable::with_id("TEACHER_ASSIGNMENT_CS101-1", VariableKind::RoomAllocation, "x", "y"));
/// ```
#[derive(Clone)]
pub struct Variable(Arc<VariableData>);

impl Variable {
    /// Creates a variable whose id is derived from its kind and entity id.
    pub fn new(kind: VariableKind, entity_id: impl Into<String>, label: impl Into<String>) -> Self {
        let entity_id = entity_id.into();
        let id = format!("{}_{}", kind.tag(), entity_id);
        Self::with_id(id, kind, entity_id, label)
    }

    /// Creates a variable with an explicit identifier.
    pub fn with_id(
        id: impl Into<String>,
        kind: VariableKind,
        entity_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self(Arc::new(VariableData {
            id: id.into(),
            kind,
            entity_id: entity_id.into(),
            label: label.into(),
        }))
    }

    /// Shorthand for tests and small models: id, entity and label are `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_id(
            name.clone(),
            VariableKind::Other("VAR".into()),
            name.clone(),
            name,
        )
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn kind(&self) -> &VariableKind {
        &self.0.kind
    }

    /// Identifier of the entity this variable decorates.
    pub fn entity_id(&self) -> &str {
        &self.0.entity_id
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({})", self.0.id)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}:{}]", self.0.label, self.0.kind.tag(), self.0.entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_id() {
        let v = Variable::new(VariableKind::ClassroomAssignment, "42", "Room for 42");
        assert_eq!(v.id(), "CLASSROOM_ASSIGNMENT_42");
        assert_eq!(v.entity_id(), "42");
        assert_eq!(v.label(), "Room for 42");
    }

    #[test]
    fn test_equality_by_id_only() {
        let a = Variable::with_id("x", VariableKind::TeacherAssignment, "1", "a");
        let b = Variable::with_id("x", VariableKind::RoomAllocation, "2", "b");
        let c = Variable::with_id("y", VariableKind::TeacherAssignment, "1", "a");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Variable> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_other_kind_tag() {
        let v = Variable::new(VariableKind::Other("EXAM".into()), "7", "exam 7");
        assert_eq!(v.id(), "EXAM_7");
    }
}
