// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! IEEE 754 binary16 conversion.

/// Converts an `f32` to half-precision bits, rounding to nearest even.
///
/// Values above the half range become infinity; NaN payloads keep their top bits
/// and stay NaN.
pub fn f32_to_f16(value: f32) -> u16 {
    let x = value.to_bits();
    let sign = x & 0x8000_0000;
    let exp = x & 0x7f80_0000;
    let man = x & 0x007f_ffff;

    let half_sign = sign >> 16;

    if exp == 0x7f80_0000 {
        let nan_bit = if man == 0 { 0 } else { 0x0200 };
        return (half_sign | 0x7c00 | nan_bit | (man >> 13)) as u16;
    }

    let unbiased_exp = ((exp >> 23) as i32) - 127;
    let half_exp = unbiased_exp + 15;

    if half_exp >= 0x1f {
        return (half_sign | 0x7c00) as u16;
    }

    if half_exp <= 0 {
        // Subnormal half, or zero when the shift drops every mantissa bit.
        if 14 - half_exp > 24 {
            return half_sign as u16;
        }
        let man = man | 0x0080_0000;
        let shift = (14 - half_exp) as u32;
        let mut half_man = man >> shift;
        let round_bit = 1u32 << (shift - 1);
        if (man & round_bit) != 0 && (man & (3 * round_bit - 1)) != 0 {
            half_man += 1;
        }
        return (half_sign | half_man) as u16;
    }

    let half_exp = (half_exp as u32) << 10;
    let half_man = man >> 13;
    let round_bit = 0x0000_1000u32;
    let bits = half_sign | half_exp | half_man;
    // A carry out of the mantissa correctly bumps the exponent.
    if (man & round_bit) != 0 && (man & (3 * round_bit - 1)) != 0 {
        (bits + 1) as u16
    } else {
        bits as u16
    }
}

/// Converts half-precision bits to an `f32`. Exact.
pub fn f16_to_f32(bits: u16) -> f32 {
    let bits = u32::from(bits);
    if bits & 0x7fff == 0 {
        return f32::from_bits(bits << 16);
    }

    let sign = (bits & 0x8000) << 16;
    let half_exp = bits & 0x7c00;
    let half_man = bits & 0x03ff;

    if half_exp == 0x7c00 {
        return if half_man == 0 {
            f32::from_bits(sign | 0x7f80_0000)
        } else {
            f32::from_bits(sign | 0x7fc0_0000 | (half_man << 13))
        };
    }

    if half_exp == 0 {
        // Subnormal: renormalize into the f32 exponent range.
        let e = (half_man as u16).leading_zeros() - 6;
        let exp = (127 - 15 - e) << 23;
        let man = (half_man << (14 + e)) & 0x007f_ffff;
        return f32::from_bits(sign | exp | man);
    }

    let exp = ((half_exp >> 10) + 127 - 15) << 23;
    f32::from_bits(sign | exp | (half_man << 13))
}
