use crate::deflate::bit_writer::BitWriter;
use crate::deflate::matcher::SymbolSink;
use crate::deflate::tables::{dist_symbol, length_symbol, HuffTables};

/// Writes symbols straight to the output with a table that is known up front.
pub(crate) struct DirectSink<'a, 'b> {
    pub(crate) writer: &'a mut BitWriter<'b>,
    pub(crate) tables: &'a HuffTables,
}

impl SymbolSink for DirectSink<'_, '_> {
    #[inline(always)]
    fn is_full(&self) -> bool {
        self.writer.is_full()
    }

    #[inline(always)]
    fn literal(&mut self, byte: u8) {
        let (bits, count) = self.tables.literal(byte);
        self.writer.write(bits, count);
    }

    #[inline(always)]
    fn copy(&mut self, len: usize, dist: usize) {
        let (len_code, len_extra, _) = length_symbol(len);
        let (dist_code, dist_extra, _) = dist_symbol(dist);

        let (bits, count) = self.tables.copy(len_code, len_extra, dist_code, dist_extra);
        self.writer.write(bits, count);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::deflate::bit_writer::PendingBits;
    use crate::deflate::header::test::BitReader;

    #[test]
    fn writes_codes_in_order() {
        let tables = HuffTables::fixed();
        let mut buf = [0u8; 32];
        let mut writer = BitWriter::new(&mut buf, PendingBits::default());

        let mut sink = DirectSink {
            writer: &mut writer,
            tables: &tables,
        };
        sink.literal(b'a');
        sink.copy(3, 1);
        assert!(!sink.is_full());

        writer.flush();
        let (n, _) = writer.finish();
        assert_eq!(n, 3);

        let mut reader = BitReader::new(&buf);
        assert_eq!(reader.symbol(&tables.lit_len), b'a' as usize);
        assert_eq!(reader.symbol(&tables.lit_len), 257);
        assert_eq!(reader.symbol(&tables.dist), 0);
    }
}
