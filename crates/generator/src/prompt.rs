// Fixed instructions sent ahead of user text. The assistant persona is
// Hebrew because the generated sites are.

pub const GENERATION_SYSTEM_PROMPT: &str = "אתה עוזר מקצועי לבניית אתרים לעסקים. \
על סמך תיאור המשתמש, צור מבנה אתר מלא בעברית. \
החזר אך ורק אובייקט JSON תקין, ללא טקסט נוסף וללא סימוני קוד, במבנה הבא: \
{\"title\": string, \"description\": string, \"theme\": string, \
\"pages\": [{\"name\": string, \"title\": string, \
\"sections\": [{\"type\": string, \"content\": object}]}]}. \
ערכי type אפשריים: hero, about, services, features, testimonials, contact, gallery, pricing, faq.";

pub const CHAT_SYSTEM_PROMPT: &str =
    "אתה עוזר ידידותי ומועיל שעונה בעברית. אתה עוזר למשתמשים לבנות אתרים ומספק עצות ותמיכה.";

/// Shown in place of an assistant reply when a chat request fails
pub const CHAT_ERROR_REPLY: &str = "מצטער, אירעה שגיאה. אנא נסה שוב.";
