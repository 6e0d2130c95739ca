//! Macros for declaring state enums.

/// Generate a `Copy` state enum together with its [`State`](crate::core::State)
/// and `Display` implementations.
///
/// # Example
///
/// ```
/// use power_sequencer::state_enum;
/// use power_sequencer::core::State;
///
/// state_enum! {
///     pub enum LinkState {
///         Down,
///         Training,
///         Up,
///     }
///     transient: [Training]
/// }
///
/// assert_eq!(LinkState::Training.name(), "Training");
/// assert!(LinkState::Training.is_transient());
/// assert!(!LinkState::Up.is_transient());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(transient: [$($transient:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_transient(&self) -> bool {
                match self {
                    $($(Self::$transient => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}
