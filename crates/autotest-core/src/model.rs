//! Test case model
//!
//! Shapes exchanged with the test planner and handed to the test writer:
//! - [`TestSuite`]: three ordered categories of cases
//! - [`TestCase`]: description, inputs, expected outcome
//! - [`ExpectedOutcome`]: either a returned value or a raised exception
//!
//! The serde layout doubles as the structured-output contract of the planner,
//! so field docs are kept in the words the model sees in the JSON schema.

use crate::error::MalformedTestCaseInput;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Scalar value a test can pass or expect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Primitive {
    /// `None`
    Null,
    /// `True` / `False`
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    Str(String),
}

/// Primitive, list of primitives, or string-keyed map of primitives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PlanValue {
    Scalar(Primitive),
    List(Vec<Primitive>),
    Map(BTreeMap<String, Primitive>),
}

impl From<Primitive> for PlanValue {
    fn from(value: Primitive) -> Self {
        Self::Scalar(value)
    }
}

impl From<i64> for PlanValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Primitive::Int(value))
    }
}

impl From<i32> for PlanValue {
    fn from(value: i32) -> Self {
        Self::Scalar(Primitive::Int(i64::from(value)))
    }
}

impl From<f64> for PlanValue {
    fn from(value: f64) -> Self {
        Self::Scalar(Primitive::Float(value))
    }
}

impl From<bool> for PlanValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Primitive::Bool(value))
    }
}

impl From<&str> for PlanValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Primitive::Str(value.to_string()))
    }
}

/// Resolved inputs: parameter name → value
pub type InputMap = BTreeMap<String, PlanValue>;

/// Inputs of a test case
///
/// The planner sends inputs as a serialized JSON object; the Plan stage
/// parses them once. Only `Resolved`, `Unresolved` and `Opaque` inputs may
/// reach the test writer.
#[derive(Debug, Clone, PartialEq)]
pub enum TestInputs {
    /// Serialized JSON object awaiting parsing
    Pending(String),
    /// Parameter name → value
    Resolved(InputMap),
    /// Inputs that failed to parse; serialized as `null`
    Unresolved,
    /// Any other shape, carried through unchanged
    Opaque(serde_json::Value),
}

impl TestInputs {
    /// Build inputs from a raw JSON value as received from the planner
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Pending(text),
            serde_json::Value::Null => Self::Unresolved,
            serde_json::Value::Object(map) => {
                let object = serde_json::Value::Object(map);
                match serde_json::from_value::<InputMap>(object.clone()) {
                    Ok(resolved) => Self::Resolved(resolved),
                    Err(_) => Self::Opaque(object),
                }
            }
            other => Self::Opaque(other),
        }
    }

    /// Raw JSON view of these inputs
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Pending(text) => serde_json::Value::String(text.clone()),
            Self::Resolved(map) => serde_json::to_value(map).unwrap_or(serde_json::Value::Null),
            Self::Unresolved => serde_json::Value::Null,
            Self::Opaque(value) => value.clone(),
        }
    }

    /// Parse serialized inputs
    ///
    /// An object of plan values becomes [`TestInputs::Resolved`]. Any other
    /// valid JSON is kept as [`TestInputs::Opaque`].
    ///
    /// # Errors
    /// Returns [`MalformedTestCaseInput`] if `text` is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, MalformedTestCaseInput> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|source| MalformedTestCaseInput {
                input: text.to_string(),
                source,
            })?;
        Ok(match value {
            serde_json::Value::Object(_) => Self::from_value(value),
            other => Self::Opaque(other),
        })
    }

    /// Still waiting for the parse pass
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Resolved map, if any
    #[inline]
    #[must_use]
    pub fn as_resolved(&self) -> Option<&InputMap> {
        match self {
            Self::Resolved(map) => Some(map),
            _ => None,
        }
    }
}

impl Serialize for TestInputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Pending(text) => serializer.serialize_str(text),
            Self::Resolved(map) => map.serialize(serializer),
            Self::Unresolved => serializer.serialize_none(),
            Self::Opaque(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TestInputs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Schema-only view of the accepted `inputs` shapes
#[derive(JsonSchema)]
#[serde(untagged)]
#[allow(dead_code)]
enum WireInputs {
    Json(String),
    Mapping(BTreeMap<String, serde_json::Value>),
    Null(()),
}

/// A test case that should succeed and return a specific value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExpectedReturn {
    /// The exact value the function is expected to return.
    pub returns: PlanValue,
}

/// A test case that should fail by raising a specific exception
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExpectedError {
    /// The name of the exception class that should be raised (e.g., 'TypeError', 'ValueError').
    pub raises: String,
}

/// Expected result of running the function
///
/// Exactly one variant: `{"returns": ...}` or `{"raises": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExpectedOutcome {
    Returns(ExpectedReturn),
    Raises(ExpectedError),
}

impl ExpectedOutcome {
    /// Expect a returned value
    #[inline]
    #[must_use]
    pub fn returns(value: impl Into<PlanValue>) -> Self {
        Self::Returns(ExpectedReturn {
            returns: value.into(),
        })
    }

    /// Expect an exception of the given kind
    #[inline]
    #[must_use]
    pub fn raises(kind: impl Into<String>) -> Self {
        Self::Raises(ExpectedError { raises: kind.into() })
    }

    /// Returned value, for success cases
    #[inline]
    #[must_use]
    pub fn returned_value(&self) -> Option<&PlanValue> {
        match self {
            Self::Returns(r) => Some(&r.returns),
            Self::Raises(_) => None,
        }
    }

    /// Exception kind, for failure cases
    #[inline]
    #[must_use]
    pub fn raised_kind(&self) -> Option<&str> {
        match self {
            Self::Raises(e) => Some(&e.raises),
            Self::Returns(_) => None,
        }
    }
}

/// A single, self-contained test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestCase {
    /// A brief, one-sentence description of the test's purpose.
    pub description: String,

    /// A JSON string representing the dictionary of function inputs. Example: '{"a": 1, "b": 2}'
    #[schemars(with = "WireInputs")]
    pub inputs: TestInputs,

    /// The expected result of running the function with the given inputs.
    pub expected_outcome: ExpectedOutcome,
}

/// What the normalization pass did to one case
#[derive(Debug)]
pub enum InputsNormalization {
    /// Serialized inputs parsed into a map
    Parsed,
    /// Already a map
    Unchanged,
    /// Parse failed; inputs now carry the unresolved marker
    Malformed(MalformedTestCaseInput),
    /// Not a map of plan values; kept as raw JSON
    Unrecognized,
}

impl TestCase {
    /// Create test case
    #[inline]
    #[must_use]
    pub fn new(description: impl Into<String>, inputs: TestInputs, expected: ExpectedOutcome) -> Self {
        Self {
            description: description.into(),
            inputs,
            expected_outcome: expected,
        }
    }

    /// Resolve pending inputs in place
    ///
    /// Malformed inputs are replaced by [`TestInputs::Unresolved`]; the case
    /// itself is always kept.
    pub fn normalize_inputs(&mut self) -> InputsNormalization {
        match &self.inputs {
            TestInputs::Pending(text) => match TestInputs::parse(text) {
                Ok(inputs) => {
                    let outcome = if inputs.as_resolved().is_some() {
                        InputsNormalization::Parsed
                    } else {
                        InputsNormalization::Unrecognized
                    };
                    self.inputs = inputs;
                    outcome
                }
                Err(err) => {
                    self.inputs = TestInputs::Unresolved;
                    InputsNormalization::Malformed(err)
                }
            },
            TestInputs::Resolved(_) => InputsNormalization::Unchanged,
            TestInputs::Unresolved | TestInputs::Opaque(_) => InputsNormalization::Unrecognized,
        }
    }

    /// Pretty JSON snapshot, as handed to the test writer
    ///
    /// # Errors
    /// Returns the serializer error; not expected for well-formed cases.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A comprehensive test suite for a single function, categorized by test type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TestSuite {
    #[serde(rename = "Happy Path / Typical Cases")]
    pub happy_path_cases: Vec<TestCase>,

    #[serde(rename = "Edge Cases")]
    pub edge_cases: Vec<TestCase>,

    #[serde(rename = "Error Conditions / Invalid Input")]
    pub error_conditions: Vec<TestCase>,
}

impl TestSuite {
    /// Create suite from its three categories
    #[inline]
    #[must_use]
    pub fn new(
        happy_path_cases: Vec<TestCase>,
        edge_cases: Vec<TestCase>,
        error_conditions: Vec<TestCase>,
    ) -> Self {
        Self {
            happy_path_cases,
            edge_cases,
            error_conditions,
        }
    }

    /// All cases: happy path, then edge, then error, each in its own order
    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.happy_path_cases
            .iter()
            .chain(&self.edge_cases)
            .chain(&self.error_conditions)
    }

    /// Mutable access in the same order as [`TestSuite::iter`]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TestCase> {
        self.happy_path_cases
            .iter_mut()
            .chain(self.edge_cases.iter_mut())
            .chain(self.error_conditions.iter_mut())
    }

    /// Total number of cases
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.happy_path_cases.len() + self.edge_cases.len() + self.error_conditions.len()
    }

    /// Check if the plan has no cases at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn case(description: &str) -> TestCase {
        TestCase::new(
            description,
            TestInputs::Pending(r#"{"a": 1, "b": 2}"#.to_string()),
            ExpectedOutcome::returns(3),
        )
    }

    #[test]
    fn serialized_inputs_normalize_to_map() {
        let mut c = case("adds");
        assert!(matches!(c.normalize_inputs(), InputsNormalization::Parsed));

        let map = c.inputs.as_resolved().unwrap();
        assert_eq!(map.get("a"), Some(&PlanValue::from(1)));
        assert_eq!(map.get("b"), Some(&PlanValue::from(2)));
    }

    #[test]
    fn malformed_inputs_become_unresolved() {
        let mut c = case("bad");
        c.inputs = TestInputs::Pending("{bad json".to_string());

        let outcome = c.normalize_inputs();
        assert!(matches!(outcome, InputsNormalization::Malformed(_)));
        assert_eq!(c.inputs, TestInputs::Unresolved);
    }

    #[test]
    fn non_object_json_string_is_kept_as_raw_json() {
        let mut c = case("list");
        c.inputs = TestInputs::Pending("[1, 2]".to_string());
        assert!(matches!(c.normalize_inputs(), InputsNormalization::Unrecognized));
        assert_eq!(c.inputs, TestInputs::Opaque(json!([1, 2])));
    }

    #[test]
    fn nested_inputs_survive_string_form() {
        let raw = r#"{"matrix": [[1, 2], [3, 4]]}"#;
        let mut c = case("matrix");
        c.inputs = TestInputs::Pending(raw.to_string());

        assert!(matches!(c.normalize_inputs(), InputsNormalization::Unrecognized));
        let inline = TestInputs::from_value(json!({"matrix": [[1, 2], [3, 4]]}));
        assert_eq!(c.inputs, inline);
        assert_eq!(c.inputs.to_value()["matrix"][1][0], json!(3));
    }

    #[test]
    fn flat_object_string_resolves() {
        let parsed = TestInputs::parse(r#"{"a": 1, "b": "x"}"#).unwrap();
        assert_eq!(parsed.as_resolved().map(InputMap::len), Some(2));
        assert!(TestInputs::parse("{bad json").is_err());
    }

    #[test]
    fn resolved_and_opaque_pass_through() {
        let mut resolved = case("resolved");
        resolved.normalize_inputs();
        let before = resolved.inputs.clone();
        assert!(matches!(resolved.normalize_inputs(), InputsNormalization::Unchanged));
        assert_eq!(resolved.inputs, before);

        let mut opaque = case("opaque");
        opaque.inputs = TestInputs::Opaque(json!(42));
        assert!(matches!(opaque.normalize_inputs(), InputsNormalization::Unrecognized));
        assert_eq!(opaque.inputs, TestInputs::Opaque(json!(42)));
    }

    #[test]
    fn inputs_from_raw_values() {
        assert_eq!(
            TestInputs::from_value(json!("{\"a\": 1}")),
            TestInputs::Pending("{\"a\": 1}".to_string())
        );
        assert_eq!(TestInputs::from_value(json!(null)), TestInputs::Unresolved);
        assert!(TestInputs::from_value(json!({"a": [1, 2]})).as_resolved().is_some());
        assert!(matches!(
            TestInputs::from_value(json!({"a": [[1]]})),
            TestInputs::Opaque(_)
        ));
        assert!(matches!(TestInputs::from_value(json!(7)), TestInputs::Opaque(_)));
    }

    #[test]
    fn expected_outcome_variants_from_json() {
        let returns: ExpectedOutcome = serde_json::from_value(json!({"returns": [1, "x", null]})).unwrap();
        assert!(returns.returned_value().is_some());

        let raises: ExpectedOutcome = serde_json::from_value(json!({"raises": "TypeError"})).unwrap();
        assert_eq!(raises.raised_kind(), Some("TypeError"));

        let null_return: ExpectedOutcome = serde_json::from_value(json!({"returns": null})).unwrap();
        assert_eq!(null_return, ExpectedOutcome::returns(Primitive::Null));
    }

    #[test]
    fn expected_outcome_rejects_both_or_neither() {
        let both = serde_json::from_value::<ExpectedOutcome>(json!({"returns": 1, "raises": "E"}));
        assert!(both.is_err());

        let neither = serde_json::from_value::<ExpectedOutcome>(json!({}));
        assert!(neither.is_err());
    }

    #[test]
    fn suite_uses_wire_category_names() {
        let suite = TestSuite::new(vec![case("h")], vec![case("e")], vec![]);
        let value = serde_json::to_value(&suite).unwrap();

        assert!(value.get("Happy Path / Typical Cases").is_some());
        assert!(value.get("Edge Cases").is_some());
        assert_eq!(value["Error Conditions / Invalid Input"], json!([]));
    }

    #[test]
    fn suite_iterates_in_category_order() {
        let suite = TestSuite::new(
            vec![case("h1"), case("h2")],
            vec![case("e1")],
            vec![case("x1"), case("x2")],
        );
        let order: Vec<_> = suite.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(order, vec!["h1", "h2", "e1", "x1", "x2"]);
        assert_eq!(suite.len(), 5);
    }

    #[test]
    fn unresolved_serializes_as_null() {
        let mut c = case("bad");
        c.inputs = TestInputs::Unresolved;
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["inputs"], json!(null));
    }
}
