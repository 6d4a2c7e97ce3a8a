use crate::engine::interpreter::ExecContext;
use crate::engine::workspace::{Region, Workspace};
use crate::error::{AllocationError, KernelError};
use crate::kernels::{int8_activation, OpContext};
use crate::quant::codec::QuantParams;

/// Entries in the int8 sigmoid table, one per input code.
pub const LUT_LEN: usize = 256;

/// Location of the operator's lookup table in the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticData {
    pub lut: Region,
}

/// Reserves and fills a 256-entry table mapping every int8 input code to
/// its quantized sigmoid. All floating-point work happens here.
pub fn prepare(ctx: &OpContext<'_>, workspace: &mut Workspace<'_>) -> Result<LogisticData, AllocationError> {
    ctx.expect_operands(1, 1, 1)?;
    let (input_idx, input) = ctx.input(0)?;
    let input_q = int8_activation(input_idx, input)?;
    let (output_idx, output) = ctx.output(0)?;
    let output_q = int8_activation(output_idx, output)?;
    if input.element_count() != output.element_count() {
        return Err(AllocationError::ShapeMismatch {
            op: ctx.index,
            reason: "logistic input and output differ in size",
        });
    }

    let lut = workspace.allocate(LUT_LEN)?;
    fill_table(workspace.bytes_mut(lut), input_q, output_q);
    Ok(LogisticData { lut })
}

/// `out[i] = lut[in[i] + 128]`.
pub fn apply(data: &LogisticData, exec: &mut ExecContext<'_, '_>) -> Result<(), KernelError> {
    let input_region = exec.input_region(0)?;
    let output_region = exec.output_region(0)?;
    let overlap = exec.fail("operand overlaps the output");

    let split = exec.split_at_output(output_region);
    let input = split.read(input_region).ok_or(overlap.clone())?;
    let lut = split.read(data.lut).ok_or(overlap)?;
    for (out, &code) in split.output.iter_mut().zip(input) {
        *out = lut[table_index(code as i8)];
    }
    Ok(())
}

fn table_index(code: i8) -> usize {
    (code as i32 - i8::MIN as i32) as usize
}

fn fill_table(table: &mut [u8], input: QuantParams, output: QuantParams) {
    for code in i8::MIN..=i8::MAX {
        let x = input.decode(code as i32);
        let y = 1.0 / (1.0 + (-x).exp());
        let q = ((y / output.scale).round() as i32)
            .saturating_add(output.zero_point)
            .clamp(i8::MIN as i32, i8::MAX as i32);
        table[table_index(code)] = q as i8 as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(input: QuantParams) -> [i8; LUT_LEN] {
        let mut raw = [0u8; LUT_LEN];
        fill_table(&mut raw, input, QuantParams::new(1.0 / 256.0, -128));
        raw.map(|b| b as i8)
    }

    #[test]
    fn zero_maps_to_one_half() {
        let lut = table(QuantParams::new(0.1, 0));
        // sigmoid(0) = 0.5 -> 128 steps of 1/256 above -128.
        assert_eq!(lut[table_index(0)], 0);
    }

    #[test]
    fn table_saturates_at_extremes() {
        let lut = table(QuantParams::new(0.1, 0));
        assert_eq!(lut[table_index(i8::MIN)], -128);
        assert_eq!(lut[table_index(i8::MAX)], 127);
    }

    #[test]
    fn table_is_monotonic() {
        let lut = table(QuantParams::new(0.05, 10));
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
    }
}
