/// PDF 文件以 `%PDF` 开头
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF")
}
