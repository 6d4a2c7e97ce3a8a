use crate::engine::interpreter::ExecContext;
use crate::error::{AllocationError, KernelError};
use crate::kernels::{int8_activation, quant_params, OpContext};
use crate::model::operator::FusedActivation;
use crate::model::tensor::DataType;
use crate::quant::fixed_point::{multiply_by_quantized_multiplier, quantize_multiplier};

/// Largest left shift a rescale factor may need; beyond it the shifted
/// accumulator no longer fits in 32 bits.
const MAX_OUTPUT_SHIFT: i32 = 30;

/// Integer parameters of one dense layer, derived at prepare time.
#[derive(Debug, Clone, PartialEq)]
pub struct FullyConnectedData {
    pub input_offset: i32,
    pub filter_offset: i32,
    pub output_offset: i32,
    pub output_multiplier: i32,
    pub output_shift: i32,
    pub activation_min: i32,
    pub activation_max: i32,
    pub batches: usize,
    pub accum_depth: usize,
    pub output_depth: usize,
}

/// Validates operands `[input, filter, bias?] -> [output]` and derives the
/// fixed-point rescale `(s_in * s_filter) / s_out`.
pub fn prepare(ctx: &OpContext<'_>) -> Result<FullyConnectedData, AllocationError> {
    ctx.expect_operands(2, 3, 1)?;
    let op = ctx.index;

    let (input_idx, input) = ctx.input(0)?;
    let input_q = int8_activation(input_idx, input)?;

    let (filter_idx, filter) = ctx.input(1)?;
    if filter.dtype != DataType::Int8 || !filter.is_constant() {
        return Err(AllocationError::InvalidTensor {
            tensor: filter_idx,
            reason: "filter must be constant int8 data",
        });
    }
    let filter_q = quant_params(filter_idx, filter)?;
    if filter.shape.len() != 2 {
        return Err(AllocationError::ShapeMismatch { op, reason: "filter must be 2-D [out, in]" });
    }
    let (output_depth, accum_depth) = (filter.shape[0], filter.shape[1]);
    if accum_depth == 0 || input.element_count() % accum_depth != 0 {
        return Err(AllocationError::ShapeMismatch {
            op,
            reason: "input size is not a multiple of the filter depth",
        });
    }
    let batches = input.element_count() / accum_depth;

    if ctx.def.inputs.len() == 3 {
        let (bias_idx, bias) = ctx.input(2)?;
        if bias.dtype != DataType::Int32 || !bias.is_constant() {
            return Err(AllocationError::InvalidTensor {
                tensor: bias_idx,
                reason: "bias must be constant int32 data",
            });
        }
        if bias.element_count() != output_depth {
            return Err(AllocationError::ShapeMismatch { op, reason: "bias length != output depth" });
        }
    }

    let (output_idx, output) = ctx.output(0)?;
    let output_q = int8_activation(output_idx, output)?;
    if batches.checked_mul(output_depth) != Some(output.element_count()) {
        return Err(AllocationError::ShapeMismatch { op, reason: "output size != batches * output depth" });
    }

    let real_multiplier =
        (input_q.scale as f64 * filter_q.scale as f64) / output_q.scale as f64;
    let (output_multiplier, output_shift) = quantize_multiplier(real_multiplier);
    if output_shift > MAX_OUTPUT_SHIFT {
        return Err(AllocationError::MultiplierOutOfRange { op, multiplier: real_multiplier });
    }
    let (activation_min, activation_max) =
        activation_range(ctx.def.fused_activation, output_q.scale, output_q.zero_point);

    Ok(FullyConnectedData {
        input_offset: -input_q.zero_point,
        filter_offset: -filter_q.zero_point,
        output_offset: output_q.zero_point,
        output_multiplier,
        output_shift,
        activation_min,
        activation_max,
        batches,
        accum_depth,
        output_depth,
    })
}

/// `out[b][o] = clamp(rescale(Σ (x + x_off)(w + w_off) + bias[o]) + out_off)`.
pub fn apply(data: &FullyConnectedData, exec: &mut ExecContext<'_, '_>) -> Result<(), KernelError> {
    let filter = exec.constant(1).ok_or_else(|| exec.fail("filter data missing"))?;
    let bias = exec.constant(2);
    let input_region = exec.input_region(0)?;
    let output_region = exec.output_region(0)?;
    let not_disjoint = exec.fail("input and output share storage");
    let undersized = exec.fail("operand buffers smaller than prepared shape");

    let split = exec.split_at_output(output_region);
    let input = split.read(input_region).ok_or(not_disjoint)?;
    let output = split.output;

    if input.len() < data.batches * data.accum_depth
        || output.len() < data.batches * data.output_depth
        || filter.len() < data.output_depth * data.accum_depth
    {
        return Err(undersized);
    }

    for b in 0..data.batches {
        let x = &input[b * data.accum_depth..(b + 1) * data.accum_depth];
        for o in 0..data.output_depth {
            let w = &filter[o * data.accum_depth..(o + 1) * data.accum_depth];
            let mut acc: i64 = x
                .iter()
                .zip(w)
                .map(|(&xi, &wi)| {
                    ((xi as i8) as i64 + data.input_offset as i64) * (wi as i64 + data.filter_offset as i64)
                })
                .sum();
            if let Some(bias) = bias {
                acc += bias[o] as i64;
            }
            let acc = acc.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            let scaled = multiply_by_quantized_multiplier(acc, data.output_multiplier, data.output_shift)
                .saturating_add(data.output_offset);
            output[b * data.output_depth + o] =
                scaled.clamp(data.activation_min, data.activation_max) as i8 as u8;
        }
    }
    Ok(())
}

/// Clamp bounds for a fused activation in the output's quantized domain.
fn activation_range(activation: FusedActivation, scale: f32, zero_point: i32) -> (i32, i32) {
    let (qmin, qmax) = (i8::MIN as i32, i8::MAX as i32);
    let quantize = |v: f32| zero_point.saturating_add((v / scale).round() as i32);
    match activation {
        FusedActivation::None => (qmin, qmax),
        FusedActivation::Relu => (qmin.max(quantize(0.0)), qmax),
        FusedActivation::Relu6 => (qmin.max(quantize(0.0)), qmax.min(quantize(6.0))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clamps_at_zero_point() {
        assert_eq!(activation_range(FusedActivation::None, 0.1, 5), (-128, 127));
        assert_eq!(activation_range(FusedActivation::Relu, 0.1, 5), (5, 127));
        assert_eq!(activation_range(FusedActivation::Relu, 0.1, -128), (-128, 127));
    }

    #[test]
    fn tiny_scale_saturates_relu6_bound() {
        assert_eq!(activation_range(FusedActivation::Relu6, 1e-30, 100), (100, 127));
        assert_eq!(activation_range(FusedActivation::Relu6, 1e-30, -128), (-128, 127));
    }

    #[test]
    fn relu6_caps_at_six() {
        assert_eq!(activation_range(FusedActivation::Relu6, 0.1, -100), (-100, -40));
        assert_eq!(activation_range(FusedActivation::Relu6, 0.01, -128), (-128, 127));
    }
}
