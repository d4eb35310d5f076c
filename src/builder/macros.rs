//! Macros for declaring state keys.

/// Declare a fieldless enum and implement [`StateKey`](crate::core::StateKey)
/// for it.
///
/// The enum derives `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Debug` and
/// serde's `Serialize`/`Deserialize`, so the calling crate needs `serde` as
/// a dependency.
///
/// # Example
///
/// ```
/// use waypoint::core::StateKey;
/// use waypoint::state_key;
///
/// state_key! {
///     pub enum Checkout {
///         Cart,
///         Payment,
///         Shipped,
///     }
/// }
///
/// assert_eq!(Checkout::Payment.name(), "Payment");
/// ```
#[macro_export]
macro_rules! state_key {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::StateKey for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
