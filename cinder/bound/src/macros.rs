/// Declares a node enum where every variant wraps a struct of the same name,
/// together with `From` conversions from each struct.
macro_rules! bound_node_declaration {
    ($(#[$meta:meta])* pub enum $name:ident {$($member_name:ident($type_name:ident)),* $(,)?}) => {
        $(#[$meta])*
        pub enum $name {
            $(
                $member_name($type_name)
            ),*
        }

        $(
            impl From<$type_name> for $name {
                fn from(value: $type_name) -> Self {
                    $name::$member_name(value)
                }
            }
        )*

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(
                        $name::$member_name(val) => write!(f, "{val:?}"),
                    )*
                }
            }
        }
    };
}
