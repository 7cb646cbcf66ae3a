use thiserror::Error;

// -----------------------------------------------------------------------------
// AccessError

/// An error raised by an accessor thunk while reading or writing a member.
///
/// Accessors are erased over `dyn Any`, so the two mismatch variants are the
/// moral equivalent of a reflective access denial: the plan was replayed
/// against an instance (or a value) of the wrong concrete type.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The instance handed to the plan is not the class the plan was built for.
    #[error("instance is not a `{expected}`")]
    InstanceType { expected: &'static str },
    /// The decoded value does not have the member's declared type.
    #[error("value is not a `{expected}`")]
    ValueType { expected: &'static str },
    /// The member was declared without an executable body.
    #[error("member `{member}` has no executable body")]
    NotInvocable { member: &'static str },
    /// The member body itself failed.
    #[error("{0}")]
    Failed(String),
}

// -----------------------------------------------------------------------------
// EncodingError

/// An enumeration of all error outcomes of plan construction, encoding and
/// decoding.
///
/// Every failure propagates synchronously to the immediate caller; there are
/// no retries and no partial recovery. The variants fall into three groups:
///
/// - configuration errors ([`UnknownBeanPrefix`], [`InvalidInline`],
///   [`UnresolvedTypeParameter`], [`UnsupportedType`]) — the registered shape
///   or its annotations are wrong, and no amount of input data can fix that;
/// - encoding failures ([`Field`], [`Instantiation`], [`Context`]) — a member
///   or a collaborator failed mid-operation, surfaced with the field name and
///   declaring class;
/// - invariant violations ([`MissingFieldRef`]) — a plan-construction bug.
///
/// [`UnknownBeanPrefix`]: EncodingError::UnknownBeanPrefix
/// [`InvalidInline`]: EncodingError::InvalidInline
/// [`UnresolvedTypeParameter`]: EncodingError::UnresolvedTypeParameter
/// [`UnsupportedType`]: EncodingError::UnsupportedType
/// [`Field`]: EncodingError::Field
/// [`Instantiation`]: EncodingError::Instantiation
/// [`Context`]: EncodingError::Context
/// [`MissingFieldRef`]: EncodingError::MissingFieldRef
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A method that does not follow the `setXyz` convention was handed to
    /// setter-name derivation.
    #[error("unknown bean prefix for method `{method}`")]
    UnknownBeanPrefix { method: &'static str },

    /// An inline-marked member does not resolve to a single registered class.
    #[error(
        "field `{field}` of `{class}` cannot be decoded inline: `{ty}` is not a single class type"
    )]
    InvalidInline {
        field: String,
        class: &'static str,
        ty: String,
    },

    /// A member's declared type names a type parameter the enclosing class
    /// does not declare, or the decode context supplied no argument for it.
    #[error("type parameter `{param}` of `{class}` cannot be resolved")]
    UnresolvedTypeParameter {
        param: &'static str,
        class: &'static str,
    },

    /// A decoded field reference matches no supported primitive or boxed kind.
    #[error("`{ty}` is not supported")]
    UnsupportedType { ty: String },

    /// A getter or setter failed while replaying a plan against an instance.
    #[error("could not encode field `{field}` of `{class}`")]
    Field {
        field: String,
        class: &'static str,
        #[source]
        source: AccessError,
    },

    /// The instance creator could not produce a new instance.
    #[error("could not create an instance of `{class}`: {reason}")]
    Instantiation {
        class: &'static str,
        reason: String,
    },

    /// A resolved field had no field reference at instantiation time.
    #[error("field `{field}` of `{class}` has no field reference")]
    MissingFieldRef {
        field: String,
        class: &'static str,
    },

    /// A wire-level collaborator (encode/decode/creation context) failed.
    #[error("{0}")]
    Context(String),
}

impl EncodingError {
    /// Shorthand used by context implementations to surface their own
    /// failures through the shared error type.
    #[inline]
    pub fn context(message: impl Into<String>) -> Self {
        Self::Context(message.into())
    }
}
