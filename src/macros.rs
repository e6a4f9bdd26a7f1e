#[macro_export]
macro_rules! buf {
    ($($x:expr),* $(,)*) => {{
        $crate::Buffer::from_slice(&[$($x,)*])
    }};
}

#[macro_export]
macro_rules! mat {
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {{
        $crate::Matrix::from_rows(&[$([$($x,)*],)*])
    }};
}
