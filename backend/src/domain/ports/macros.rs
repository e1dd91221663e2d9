//! Helper macro for declaring port error enums with typed constructors.

/// Declares a `thiserror` enum whose variants each carry a display message,
/// and generates a snake_case constructor per variant. Constructor arguments
/// take `impl Into<T>` so call sites can pass `&str` for `String` fields.
macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<$variant:snake>](
                        $( $($field: impl ::core::convert::Into<$ty>),* )?
                    ) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum SampleStoreError {
            Unavailable => "store unavailable",
            Lookup { message: String } => "lookup failed: {message}",
            Conflict { message: String, attempts: u32 } => "conflict: {message} ({attempts})",
        }
    }

    #[test]
    fn unit_variants_get_no_arg_constructors() {
        let err = SampleStoreError::unavailable();
        assert_eq!(err.to_string(), "store unavailable");
    }

    #[test]
    fn string_fields_accept_str_slices() {
        let err = SampleStoreError::lookup("row missing");
        assert_eq!(err.to_string(), "lookup failed: row missing");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SampleStoreError::conflict("stale write", 3_u32);
        assert_eq!(err.to_string(), "conflict: stale write (3)");
    }
}
