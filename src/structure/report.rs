//! Human readable layout report.

use std::fmt;

use super::BufferStructure;

impl fmt::Display for BufferStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (bi, buffer) in self.buffers() {
            write!(f, "buffer {} \"{}\": {} bytes", bi, buffer.id(), buffer.byte_length())?;
            if let Some(uri) = buffer.uri() {
                write!(f, " uri={uri}")?;
            }
            writeln!(f)?;

            for &vi in buffer.views() {
                let view = self.buffer_view(vi);
                write!(
                    f,
                    "  view {} \"{}\": offset={} length={} align={}",
                    vi,
                    view.id(),
                    view.byte_offset(),
                    view.byte_length(),
                    view.alignment()
                )?;
                if let Some(stride) = view.byte_stride() {
                    write!(f, " stride={stride}")?;
                }
                if let Some(target) = view.target() {
                    write!(f, " target={target}")?;
                }
                writeln!(f)?;

                for &ai in view.accessors() {
                    let a = self.accessor(ai);
                    writeln!(
                        f,
                        "    accessor {} \"{}\": {} {} x{} offset={} stride={} bytes={}",
                        ai,
                        a.id(),
                        a.element_type(),
                        a.component_type(),
                        a.count(),
                        a.byte_offset(),
                        a.byte_stride(),
                        a.data_byte_length()
                    )?;
                }
            }

            if !buffer.padding_ranges().is_empty() {
                write!(f, "  padding:")?;
                for r in buffer.padding_ranges() {
                    write!(f, " [{}..{})", r.start, r.end)?;
                }
                writeln!(f)?;
            }
        }

        let loose: Vec<&str> = self
            .accessors()
            .filter(|(_, a)| a.buffer_view().is_none())
            .map(|(_, a)| a.id())
            .collect();
        if !loose.is_empty() {
            writeln!(f, "ungrouped accessors: {}", loose.join(", "))?;
        }
        Ok(())
    }
}
