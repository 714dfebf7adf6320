//! Port of the `pow` function found in the Balancer contract code. The
//! results match the contract bit for bit, which keeps weight curves
//! reproducible across implementations.
// The contract code can be found at:
// https://github.com/balancer-labs/balancer-v2-monorepo/blob/6c9e24e22d0c46cca6dd15861d3d33da61a60b98/pkg/solidity-utils/contracts/math/LogExpMath.sol

use {
    super::{Error, ONE_18 as UFIXED256X18_ONE},
    alloy_primitives::{I256, U256},
    std::sync::LazyLock,
};

/// Fixed point number stored in a type of bit size 256 that stores exactly 18
/// decimal digits.
type Ufixed256x18 = U256;

fn int(value: i128) -> I256 {
    I256::try_from(value).expect("every i128 fits into an I256")
}

static ONE_18: LazyLock<I256> = LazyLock::new(|| int(10_i128.pow(18)));
static ONE_20: LazyLock<I256> = LazyLock::new(|| int(10_i128.pow(20)));
static ONE_36: LazyLock<I256> = LazyLock::new(|| int(10_i128.pow(36)));
static MAX_NATURAL_EXPONENT: LazyLock<I256> = LazyLock::new(|| *ONE_18 * int(130));
static MIN_NATURAL_EXPONENT: LazyLock<I256> = LazyLock::new(|| *ONE_18 * int(-41));
static LN_36_LOWER_BOUND: LazyLock<I256> =
    LazyLock::new(|| *ONE_18 - int(100_000_000_000_000_000));
static LN_36_UPPER_BOUND: LazyLock<I256> =
    LazyLock::new(|| *ONE_18 + int(100_000_000_000_000_000));
static MILD_EXPONENT_BOUND: LazyLock<Ufixed256x18> =
    LazyLock::new(|| (U256::from(1) << 254_usize) / U256::from(10).pow(U256::from(20)));

fn constant_x_20(i: u32) -> I256 {
    int(match i {
        2 => 3_200_000_000_000_000_000_000,
        3 => 1_600_000_000_000_000_000_000,
        4 => 800_000_000_000_000_000_000,
        5 => 400_000_000_000_000_000_000,
        6 => 200_000_000_000_000_000_000,
        7 => 100_000_000_000_000_000_000,
        8 => 50_000_000_000_000_000_000,
        9 => 25_000_000_000_000_000_000,
        10 => 12_500_000_000_000_000_000,
        11 => 6_250_000_000_000_000_000,
        _ => panic!("Constant not provided"),
    })
}

fn constant_x_18(i: u32) -> I256 {
    int(match i {
        0 => 128_000_000_000_000_000_000,
        1 => 64_000_000_000_000_000_000,
        _ => panic!("Constant not provided"),
    })
}

fn constant_a_20(i: u32) -> I256 {
    int(match i {
        2 => 7_896_296_018_268_069_516_100_000_000_000_000,
        3 => 888_611_052_050_787_263_676_000_000,
        4 => 298_095_798_704_172_827_474_000,
        5 => 5_459_815_003_314_423_907_810,
        6 => 738_905_609_893_065_022_723,
        7 => 271_828_182_845_904_523_536,
        8 => 164_872_127_070_012_814_685,
        9 => 128_402_541_668_774_148_407,
        10 => 113_314_845_306_682_631_683,
        11 => 106_449_445_891_785_942_956,
        _ => panic!("Constant not provided"),
    })
}

static A0: LazyLock<I256> = LazyLock::new(|| {
    I256::from_dec_str("38877084059945950922200000000000000000000000000000000000")
        .expect("valid constant")
});

fn constant_a_18(i: u32) -> I256 {
    match i {
        // Does not fit into an i128.
        0 => *A0,
        1 => int(6_235_149_080_811_616_882_910_000_000),
        _ => panic!("Constant not provided"),
    }
}

/// Computes `x^y` for two 18 decimal fixed point numbers.
pub fn pow(x: Ufixed256x18, y: Ufixed256x18) -> Result<Ufixed256x18, Error> {
    if y.is_zero() {
        return Ok(UFIXED256X18_ONE);
    }
    if x.is_zero() {
        return Ok(U256::ZERO);
    }

    let x_int256 = I256::try_from(x).map_err(|_| Error::XOutOfBounds)?;
    if y >= *MILD_EXPONENT_BOUND {
        return Err(Error::YOutOfBounds);
    }
    let y_int256 = I256::try_from(y).map_err(|_| Error::YOutOfBounds)?;

    let mut logx_times_y = if *LN_36_LOWER_BOUND < x_int256 && x_int256 < *LN_36_UPPER_BOUND {
        let ln_36_x = ln_36(x_int256);
        (ln_36_x / *ONE_18) * y_int256 + ((ln_36_x % *ONE_18) * y_int256) / *ONE_18
    } else {
        ln(x_int256) * y_int256
    };
    logx_times_y /= *ONE_18;

    if !(*MIN_NATURAL_EXPONENT <= logx_times_y && logx_times_y <= *MAX_NATURAL_EXPONENT) {
        return Err(Error::ProductOutOfBounds);
    }

    exp(logx_times_y).map(|v| v.into_raw())
}

fn exp(mut x: I256) -> Result<I256, Error> {
    if !(x >= *MIN_NATURAL_EXPONENT && x <= *MAX_NATURAL_EXPONENT) {
        return Err(Error::InvalidExponent);
    }

    if x < I256::ZERO {
        return Ok((*ONE_18 * *ONE_18) / exp(-x)?);
    }

    let first_an;
    if x >= constant_x_18(0) {
        x -= constant_x_18(0);
        first_an = constant_a_18(0);
    } else if x >= constant_x_18(1) {
        x -= constant_x_18(1);
        first_an = constant_a_18(1);
    } else {
        first_an = int(1);
    }

    x *= int(100);

    let mut product = *ONE_20;
    for i in 2..=9 {
        if x >= constant_x_20(i) {
            x -= constant_x_20(i);
            product = (product * constant_a_20(i)) / *ONE_20;
        }
    }

    let mut series_sum = *ONE_20;
    let mut term = x;
    series_sum += term;

    for i in 2..=12 {
        term = ((term * x) / *ONE_20) / int(i);
        series_sum += term;
    }

    Ok((((product * series_sum) / *ONE_20) * first_an) / int(100))
}

fn ln(mut a: I256) -> I256 {
    if a < *ONE_18 {
        return -ln((*ONE_18 * *ONE_18) / a);
    }

    let mut sum = I256::ZERO;
    for i in 0..=1 {
        if a >= constant_a_18(i) * *ONE_18 {
            a /= constant_a_18(i);
            sum += constant_x_18(i);
        }
    }

    sum *= int(100);
    a *= int(100);

    for i in 2..=11 {
        if a >= constant_a_20(i) {
            a = (a * *ONE_20) / constant_a_20(i);
            sum += constant_x_20(i);
        }
    }

    let z = ((a - *ONE_20) * *ONE_20) / (a + *ONE_20);
    let z_squared = (z * z) / *ONE_20;

    let mut num = z;
    let mut series_sum = num;

    for i in (3..=11).step_by(2) {
        num = (num * z_squared) / *ONE_20;
        series_sum += num / int(i);
    }

    series_sum *= int(2);

    (sum + series_sum) / int(100)
}

fn ln_36(mut x: I256) -> I256 {
    x *= *ONE_18;

    let z = ((x - *ONE_36) * *ONE_36) / (x + *ONE_36);
    let z_squared = (z * z) / *ONE_36;

    let mut num = z;
    let mut series_sum = num;

    for i in (3..=15).step_by(2) {
        num = (num * z_squared) / *ONE_36;
        series_sum += num / int(i);
    }

    series_sum * int(2)
}

#[cfg(test)]
mod tests {
    use {super::*, regex::Regex};

    fn i256(value: &str) -> I256 {
        I256::from_dec_str(value).unwrap()
    }

    fn u256(value: &str) -> U256 {
        U256::from_str_radix(value, 10).unwrap()
    }

    // Compares the constants with the declarations in the contract code.
    #[test]
    fn contract_constants() {
        // https://github.com/balancer-labs/balancer-v2-monorepo/blob/6c9e24e22d0c46cca6dd15861d3d33da61a60b98/pkg/solidity-utils/contracts/math/LogExpMath.sol#L61-L86
        let code = "
    int256 constant x0 = 128000000000000000000; // 2ˆ7
    int256 constant a0 = 38877084059945950922200000000000000000000000000000000000; // eˆ(x0) (no decimals)
    int256 constant x1 = 64000000000000000000; // 2ˆ6
    int256 constant a1 = 6235149080811616882910000000; // eˆ(x1) (no decimals)
    int256 constant x2 = 3200000000000000000000; // 2ˆ5
    int256 constant a2 = 7896296018268069516100000000000000; // eˆ(x2)
    int256 constant x7 = 100000000000000000000; // 2ˆ0
    int256 constant a7 = 271828182845904523536; // eˆ(x7)
    int256 constant x11 = 6250000000000000000; // 2ˆ-4
    int256 constant a11 = 106449445891785942956; // eˆ(x11)
    ";
        let re = Regex::new(r".* ([ax])(\d+) = (\d+);.*$").unwrap();
        for line in code.lines().filter(|line| !line.trim().is_empty()) {
            let cap = re.captures(line).unwrap();
            let index: u32 = cap[2].parse().unwrap();
            let actual = match (&cap[1], index) {
                ("x", 0 | 1) => constant_x_18(index),
                ("a", 0 | 1) => constant_a_18(index),
                ("x", _) => constant_x_20(index),
                ("a", _) => constant_a_20(index),
                _ => unreachable!(),
            };
            assert_eq!(actual.to_string(), &cap[3]);
        }
    }

    #[test]
    fn ln_success() {
        // Reference values generated by calling the contract's `_ln`.
        let cases = [
            ("1", "-41446531673892822312"),
            ("1000000", "-27631021115928548208"),
            ("1000000000000000000", "0"),
            ("100000000000000000000000", "11512925464970228420"),
            (
                "100000000000000000000000000000000000000000",
                "52959457138863050732",
            ),
        ];
        for (input, output) in cases {
            assert_eq!(ln(i256(input)), i256(output));
        }
    }

    #[test]
    fn ln_36_success() {
        let cases = [
            ("900000000000000000", "-105360515657826301227479460574005190"),
            ("999999999999999999", "-1000000000000000000"),
            ("1000000000000000000", "0"),
            ("1050000000000000000", "48790164169432003065374404178136230"),
        ];
        for (input, output) in cases {
            assert_eq!(ln_36(i256(input)), i256(output));
        }
    }

    #[test]
    fn exp_success() {
        let cases = [
            ("-41000000000000000000", "1"),
            ("-1000000000000000000", "367879441171442321"),
            ("0", "1000000000000000000"),
            ("1000000000000000000", "2718281828459045235"),
            ("10000000000000000000", "22026465794806716516930"),
        ];
        for (input, output) in cases {
            assert_eq!(exp(i256(input)).unwrap(), i256(output));
        }
    }

    #[test]
    fn exp_error() {
        for input in ["-41000000000000000001", "130000000000000000001"] {
            assert_eq!(exp(i256(input)).unwrap_err(), "009".into());
        }
    }

    #[test]
    fn pow_success() {
        let cases = [
            (
                "1000000000000000000",
                "289480223093290488558927462521719769633174961664101410097",
                "1000000000000000000",
            ),
            ("1250152867", "2000000000000000000", "1"),
            ("0", "1000000000000000000000", "0"),
            ("0", "0", "1000000000000000000"),
            ("2000000000000000000", "2000000000000000000", "3999999999999999996"),
        ];
        for (x, y, output) in cases {
            assert_eq!(pow(u256(x), u256(y)).unwrap(), u256(output));
        }
    }

    #[test]
    fn pow_error() {
        let cases = [
            (
                "57896044618658097711785492504343953926634992332820282019728792003956564819968",
                "1",
                "006",
            ),
            (
                "1000000000000000000",
                "289480223093290488558927462521719769633174961664101410098",
                "007",
            ),
            ("1250152866", "2000000000000000000", "008"),
            ("130000000000000000001", "130000000000000000001", "008"),
        ];
        for (x, y, code) in cases {
            assert_eq!(pow(u256(x), u256(y)).unwrap_err(), code.into());
        }
    }

    #[test]
    #[should_panic]
    fn missing_constant_panics() {
        constant_x_20(12);
    }
}
