pub mod config;
pub mod core;

/// Declares a serde struct whose fields all carry a default value. Missing
/// fields fall back to their default when deserializing.
#[macro_export]
macro_rules! serializable_struct_with_defaults {
    ( $name:ident { $( $(#[$attr:meta])* $param:ident : $type:ty = $default:expr ),* $(,)? } ) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        #[serde(default)]
        pub struct $name {
            $(
                $(#[$attr])*
                pub $param : $type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $param: $default, )*
                }
            }
        }
    };
}
