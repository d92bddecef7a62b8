//! Partial and complete assignments.

use super::value::{Payload, Value};
use super::variable::Variable;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A mapping from variables to chosen values, plus a typed context table.
///
/// `Assignment` is a value type: `clone()` yields a fully independent copy,
/// so sibling branches of a backtracking search never observe each other's
/// changes. Variables and values are reference-counted, which keeps copies
/// cheap.
///
/// The context table holds at most one value per Rust type. Constraints
/// that need per-solve bookkeeping define their own context struct and
/// read it back with [`Assignment::context`].
///
/// # Examples
///
/// ```
/// use u_csp::model::{Assignment, Value, Variable};
///
/// let x = Variable::named("x");
/// let mut a = Assignment::new();
/// a.assign(x.clone(), Value::named("A"));
///
/// let mut b = a.clone();
/// b.unassign(&x);
/// assert!(a.is_assigned(&x));
/// assert!(!b.is_assigned(&x));
/// ```
pub struct Assignment<P = ()> {
    values: HashMap<Variable, Value<P>>,
    context: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl<P: Payload> Assignment<P> {
    /// Creates an empty assignment.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            context: HashMap::new(),
        }
    }

    /// Assigns `value` to `variable`, replacing any previous value.
    pub fn assign(&mut self, variable: Variable, value: Value<P>) {
        self.values.insert(variable, value);
    }

    /// Removes the value of `variable`, returning it if it was assigned.
    pub fn unassign(&mut self, variable: &Variable) -> Option<Value<P>> {
        self.values.remove(variable)
    }

    pub fn get(&self, variable: &Variable) -> Option<&Value<P>> {
        self.values.get(variable)
    }

    pub fn is_assigned(&self, variable: &Variable) -> bool {
        self.values.contains_key(variable)
    }

    /// Whether every variable in `variables` has a value.
    pub fn is_complete<'a>(&self, variables: impl IntoIterator<Item = &'a Variable>) -> bool {
        variables.into_iter().all(|v| self.is_assigned(v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(variable, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Value<P>)> {
        self.values.iter()
    }

    /// Copies every pair of `other` into `self`.
    ///
    /// Context entries of `other` are merged as well; on a type clash the
    /// entry already in `self` is kept.
    pub fn extend(&mut self, other: &Assignment<P>) {
        for (var, val) in &other.values {
            self.values.insert(var.clone(), val.clone());
        }
        for (ty, ctx) in &other.context {
            self.context.entry(*ty).or_insert_with(|| Arc::clone(ctx));
        }
    }

    /// Stores a typed context object, replacing any previous one of type `T`.
    pub fn insert_context<T: Any + Send + Sync>(&mut self, value: T) {
        self.context.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Returns the context object of type `T`, if present.
    pub fn context<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.context
            .get(&TypeId::of::<T>())
            .and_then(|ctx| ctx.downcast_ref::<T>())
    }

    /// Removes the context object of type `T`.
    pub fn remove_context<T: Any + Send + Sync>(&mut self) -> bool {
        self.context.remove(&TypeId::of::<T>()).is_some()
    }
}

impl<P: Payload> Default for Assignment<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for Assignment<P> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            context: self.context.clone(),
        }
    }
}

impl<P: PartialEq> PartialEq for Assignment<P> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<P: fmt::Debug> fmt::Debug for Assignment<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<_> = self.values.iter().collect();
        pairs.sort_by(|a, b| a.0.id().cmp(b.0.id()));
        f.debug_map()
            .entries(pairs.into_iter().map(|(k, v)| (k.id(), v)))
            .finish()
    }
}

impl<P: Payload> FromIterator<(Variable, Value<P>)> for Assignment<P> {
    fn from_iter<I: IntoIterator<Item = (Variable, Value<P>)>>(iter: I) -> Self {
        let mut assignment = Self::new();
        for (var, val) in iter {
            assignment.assign(var, val);
        }
        assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TeacherLoad(Vec<&'static str>);

    #[test]
    fn test_assign_and_complete() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let mut a = Assignment::new();
        assert!(a.is_empty());
        a.assign(x.clone(), Value::named("A"));
        assert!(!a.is_complete([&x, &y]));
        a.assign(y.clone(), Value::named("B"));
        assert!(a.is_complete([&x, &y]));
        assert_eq!(a.len(), 2);
        assert_eq!(a.get(&y).map(|v| v.id()), Some("B"));
    }

    #[test]
    fn test_clone_is_independent() {
        let x = Variable::named("x");
        let mut a = Assignment::new();
        a.assign(x.clone(), Value::named("A"));
        a.insert_context(TeacherLoad(vec!["t1"]));

        let mut b = a.clone();
        b.assign(x.clone(), Value::named("B"));
        b.insert_context(TeacherLoad(vec!["t2"]));

        assert_eq!(a.get(&x).map(|v| v.id()), Some("A"));
        assert_eq!(a.context::<TeacherLoad>(), Some(&TeacherLoad(vec!["t1"])));
        assert_eq!(b.context::<TeacherLoad>(), Some(&TeacherLoad(vec!["t2"])));
    }

    #[test]
    fn test_typed_context() {
        let mut a: Assignment = Assignment::new();
        assert!(a.context::<TeacherLoad>().is_none());
        a.insert_context(TeacherLoad(vec![]));
        a.insert_context(7usize);
        assert_eq!(a.context::<usize>(), Some(&7));
        assert!(a.remove_context::<usize>());
        assert!(a.context::<usize>().is_none());
        assert!(a.context::<TeacherLoad>().is_some());
    }

    #[test]
    fn test_extend_merges() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let a: Assignment = [(x.clone(), Value::named("A"))].into_iter().collect();
        let mut b: Assignment = [(y.clone(), Value::named("B"))].into_iter().collect();
        b.extend(&a);
        assert!(b.is_complete([&x, &y]));
    }
}
