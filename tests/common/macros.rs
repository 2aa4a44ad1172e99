/// Asserts that a value lies within a closed interval.
#[macro_export]
macro_rules! assert_in_range {
    ($value:expr, $low:expr, $high:expr) => {
        let v = $value;
        assert!(
            v >= $low && v <= $high,
            "{} = {} is outside [{}, {}]",
            stringify!($value),
            v,
            $low,
            $high
        );
    };
}

/// Asserts that two floats agree within a tolerance.
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left, $right);
        assert!(
            (l - r).abs() <= $tol,
            "{} = {} differs from {} = {} by more than {}",
            stringify!($left),
            l,
            stringify!($right),
            r,
            $tol
        );
    };
}

/// Asserts that a brain or agent step failed with a collision.
#[macro_export]
macro_rules! assert_collision {
    ($result:expr) => {
        match $result {
            Err(err) => assert!(err.collision().is_some(), "Expected collision, got {err}"),
            Ok(_) => panic!("Expected collision, step succeeded"),
        }
    };
}
