/// 验证文件内容的魔术字节是否与扩展名匹配
///
/// # Arguments
/// * `data` - 文件内容的前几个字节
/// * `extension` - 文件扩展名（不含点号，如 "pdf"）
///
/// # Returns
/// * `true` - 魔术字节匹配
/// * `false` - 魔术字节不匹配或不支持的类型
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.trim_start_matches('.').to_lowercase().as_str() {
        // 讲义
        "pdf" => data.starts_with(b"%PDF"),

        // 视频：ISO BMFF 容器在偏移 4 处有 "ftyp" 标识
        "mp4" | "mov" | "m4v" => data.len() >= 8 && &data[4..8] == b"ftyp",
        "avi" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"AVI ",
        // Matroska / WebM (EBML)
        "mkv" | "webm" => data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]),

        // 未知格式 - 默认拒绝
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_magic() {
        let pdf_header = b"%PDF-1.4";
        assert!(validate_magic_bytes(pdf_header, "pdf"));
        assert!(validate_magic_bytes(pdf_header, ".PDF"));
        assert!(!validate_magic_bytes(pdf_header, "mp4"));
    }

    #[test]
    fn test_mp4_magic() {
        let mp4_header = [0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm'];
        assert!(validate_magic_bytes(&mp4_header, "mp4"));
        assert!(validate_magic_bytes(&mp4_header, "mov"));
        assert!(!validate_magic_bytes(&mp4_header, "pdf"));
    }

    #[test]
    fn test_avi_magic() {
        let avi_header = b"RIFF\x00\x00\x00\x00AVI LIST";
        assert!(validate_magic_bytes(avi_header, "avi"));
        let wav_header = b"RIFF\x00\x00\x00\x00WAVEfmt ";
        assert!(!validate_magic_bytes(wav_header, "avi"));
    }

    #[test]
    fn test_mkv_magic() {
        let mkv_header = [0x1A, 0x45, 0xDF, 0xA3, 0x01];
        assert!(validate_magic_bytes(&mkv_header, "mkv"));
    }

    #[test]
    fn test_empty_data() {
        assert!(!validate_magic_bytes(&[], "pdf"));
    }

    #[test]
    fn test_unknown_extension() {
        let data = b"MZ\x90\x00";
        assert!(!validate_magic_bytes(data, "exe"));
    }
}
