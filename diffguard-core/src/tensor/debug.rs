// src/tensor/debug.rs
use std::fmt;

use crate::buffer::Buffer;
use crate::tensor::Tensor;

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data.try_read() {
            Ok(guard) => {
                let graphs: Vec<String> = guard
                    .slots
                    .iter()
                    .map(|slot| {
                        format!(
                            "{}:{}{}",
                            slot.graph_id,
                            if slot.node.is_leaf() { "leaf" } else { "op" },
                            if slot.grad.is_some() { "+grad" } else { "" }
                        )
                    })
                    .collect();
                write!(
                    f,
                    "Tensor(shape={:?}, dtype={:?}, graphs=[{}])",
                    guard.shape,
                    guard.dtype,
                    graphs.join(", ")
                )
            }
            Err(_) => write!(f, "Tensor(<locked>)"),
        }
    }
}

/// Prints the elements as nested lists, e.g. `tensor([[1, 2], [3, 4]], dtype=float32)`.
impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = match self.data.try_read() {
            Ok(guard) => guard,
            Err(_) => return write!(f, "tensor(<locked>)"),
        };
        let elements: Vec<String> = match &*guard.buffer {
            Buffer::F32(data) => data.iter().map(|x| format!("{}", x)).collect(),
            Buffer::F64(data) => data.iter().map(|x| format!("{}", x)).collect(),
        };
        let mut body = String::new();
        if guard.shape.is_empty() {
            body.push_str(elements.first().map(String::as_str).unwrap_or(""));
        } else {
            write_nested(&mut body, &elements, &guard.shape);
        }
        write!(f, "tensor({}, dtype={})", body, guard.dtype)
    }
}

fn write_nested(out: &mut String, elements: &[String], shape: &[usize]) {
    out.push('[');
    match shape {
        [] => {}
        [_] => out.push_str(&elements.join(", ")),
        [dim, rest @ ..] => {
            let chunk: usize = rest.iter().product();
            for i in 0..*dim {
                if i > 0 {
                    out.push_str(", ");
                }
                write_nested(out, &elements[i * chunk..(i + 1) * chunk], rest);
            }
        }
    }
    out.push(']');
}
