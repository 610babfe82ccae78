// Assistant copy used when no live AI reply is available, plus the greeting.
// Keyword lists are matched against the lowercased user text.

use crate::chat::conversation::UserInfo;

pub const GUEST_GREETING: &str = "Xin chào! Tôi là AI Assistant của JobHunter. \
    Tôi có thể giúp bạn tìm việc làm phù hợp, tư vấn về CV, hoặc trả lời các câu hỏi về nghề nghiệp. \
    Bạn cần hỗ trợ gì?";

pub const JOB_SEARCH_REPLY: &str = "Tôi có thể giúp bạn tìm việc làm phù hợp! \
    Bạn có thể tìm kiếm theo ngành nghề, địa điểm, hoặc mức lương mong muốn. \
    Bạn quan tâm đến lĩnh vực nào?";

pub const CV_REPLY: &str = "Tôi có thể tư vấn về cách viết CV hiệu quả! \
    Một CV tốt nên có: thông tin cá nhân rõ ràng, kinh nghiệm làm việc chi tiết, kỹ năng phù hợp, \
    và thành tích nổi bật. Bạn muốn tư vấn về phần nào?";

pub const SKILLS_REPLY: &str = "Kỹ năng là yếu tố quan trọng trong tìm việc! \
    Các kỹ năng phổ biến hiện nay bao gồm: lập trình, marketing, quản lý dự án, ngoại ngữ... \
    Bạn có kỹ năng nào nổi bật?";

pub const INTERVIEW_REPLY: &str = "Chuẩn bị phỏng vấn là bước quan trọng! \
    Tôi khuyên bạn: nghiên cứu về công ty, chuẩn bị câu trả lời cho các câu hỏi thường gặp, \
    ăn mặc phù hợp, và tự tin. Bạn có câu hỏi cụ thể nào về phỏng vấn?";

pub const SALARY_REPLY: &str = "Mức lương phụ thuộc vào nhiều yếu tố như kinh nghiệm, kỹ năng, \
    địa điểm và ngành nghề. Bạn có thể tham khảo các trang web tuyển dụng để biết mức lương \
    trung bình cho vị trí bạn quan tâm.";

pub const COMPANY_REPLY: &str = "Tôi có thể giúp bạn tìm hiểu về các công ty phù hợp! \
    Bạn quan tâm đến lĩnh vực nào? Có thể là công nghệ, tài chính, marketing, hoặc các ngành khác?";

pub const GENERIC_REPLY: &str = "Cảm ơn bạn đã hỏi! Tôi là AI Assistant chuyên về tư vấn nghề nghiệp \
    và tìm việc làm. Bạn có thể hỏi tôi về: tìm việc làm, viết CV, kỹ năng cần thiết, \
    chuẩn bị phỏng vấn, hoặc thông tin về các công ty. Tôi có thể giúp gì thêm cho bạn?";

pub const SERVICE_DEGRADED_REPLY: &str = "Xin lỗi, AI Server đang gặp sự cố hoặc quá tải. \
    Vui lòng thử lại sau.";

pub const MISCONFIGURED_ENDPOINT_REPLY: &str = "Xin lỗi, không tìm thấy dịch vụ chat của AI Server. \
    Hệ thống có thể đang bị cấu hình sai, vui lòng liên hệ quản trị viên.";

/// First match wins, so order matters.
const KEYWORD_TABLE: &[(&[&str], &str)] = &[
    (&["việc làm", "job", "tuyển dụng"], JOB_SEARCH_REPLY),
    (&["cv", "resume", "hồ sơ"], CV_REPLY),
    (&["kỹ năng", "skill"], SKILLS_REPLY),
    (&["phỏng vấn", "interview"], INTERVIEW_REPLY),
    (&["lương", "salary", "thu nhập"], SALARY_REPLY),
    (&["công ty", "company", "doanh nghiệp"], COMPANY_REPLY),
];

/// Rule-based reply for `user_text`: case-insensitive substring match against the keyword table.
pub fn canned_reply(user_text: &str) -> &'static str {
    let lowered = user_text.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(GENERIC_REPLY)
}

pub fn greeting_for(identity: Option<&UserInfo>) -> String {
    match identity {
        Some(user) if !user.name.trim().is_empty() => format!(
            "Xin chào {}! Tôi là AI Assistant của JobHunter. \
             Tôi có thể giúp bạn tìm việc làm phù hợp, tư vấn về CV, hoặc trả lời các câu hỏi về nghề nghiệp. \
             Bạn cần hỗ trợ gì?",
            user.name.trim()
        ),
        _ => GUEST_GREETING.to_string(),
    }
}
