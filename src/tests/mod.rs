// Test modules for the timing wheel
//
// 时间轮测试模块

mod wheel {
    mod advance_tests;
    mod repeat_tests;
    mod reset_tests;
}

mod timer {
    mod cancel_tests;
    mod lifecycle_tests;
    mod repeat_tests;
}

mod group {
    mod group_tests;
}
