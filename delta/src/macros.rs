//! The `delta_record!` declaration macro.

/// Declares a plain record struct and implements [`DeltaRecord`](crate::DeltaRecord) for it.
///
/// Field declaration order becomes the change-mask bit order. The schema is
/// validated at compile time: an empty record, a record with more than 16
/// fields, or a field whose type is not a supported primitive fails to build.
///
/// ```
/// delta::delta_record! {
///     /// Player position.
///     #[derive(Eq)]
///     pub struct Marker {
///         pub id: u32,
///         pub team: u8,
///     }
/// }
///
/// use delta::DeltaRecord;
/// assert_eq!(Marker::SCHEMA.len(), 2);
/// assert_eq!(Marker::SCHEMA.fields()[1].name, "team");
/// ```
///
/// ```compile_fail
/// delta::delta_record! {
///     struct Wide {
///         f0: u8, f1: u8, f2: u8, f3: u8, f4: u8, f5: u8, f6: u8, f7: u8,
///         f8: u8, f9: u8, f10: u8, f11: u8, f12: u8, f13: u8, f14: u8,
///         f15: u8, f16: u8,
///     }
/// }
/// ```
#[macro_export]
macro_rules! delta_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )+
        }

        impl $crate::DeltaRecord for $name {
            const SCHEMA: $crate::Schema = {
                const FIELDS: &[$crate::FieldDef] = &[
                    $(
                        $crate::FieldDef::new(
                            stringify!($field),
                            <$ty as $crate::FieldType>::KIND,
                        ),
                    )+
                ];
                $crate::Schema::checked(stringify!($name), FIELDS)
            };

            fn field(&self, index: usize) -> Option<$crate::FieldValue> {
                let mut slot = 0usize;
                $(
                    if index == slot {
                        return Some($crate::FieldType::into_value(self.$field));
                    }
                    slot += 1;
                )+
                let _ = slot;
                None
            }

            fn set_field(
                &mut self,
                index: usize,
                value: $crate::FieldValue,
            ) -> $crate::DeltaResult<()> {
                let mut slot = 0usize;
                $(
                    if index == slot {
                        return match <$ty as $crate::FieldType>::from_value(value) {
                            Some(v) => {
                                self.$field = v;
                                Ok(())
                            }
                            None => Err($crate::DeltaError::KindMismatch {
                                index,
                                expected: <$ty as $crate::FieldType>::KIND,
                                found: value.kind(),
                            }),
                        };
                    }
                    slot += 1;
                )+
                let _ = slot;
                Err($crate::DeltaError::UnknownField { index })
            }
        }

        const _: () = {
            let _ = <$name as $crate::DeltaRecord>::SCHEMA;
        };
    };
}
