/// Generate [`From`] implementations for an error type.
///
/// Most operation errors here wrap a handful of lower-level failures; this
/// cuts the boilerplate of converting each of them.
macro_rules! impl_from {
    {
        for $type:ty ;
        $(
            $from:ty => | $pat:pat | $value:expr
        ),+
        $(,)*
    } => {
        $(
            impl From<$from> for $type {
                fn from($pat: $from) -> $type {
                    $value
                }
            }
        )+
    };
}
